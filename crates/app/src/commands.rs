use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use services::{AdvanceOutcome, AppServices, SessionError, SessionScope};
use study_core::model::{
    AnswerOptions, AppState, ContentItem, NoteDraft, OptionLabel, QuestionDraft, SubjectId,
};

use crate::cli::AddQuestionArgs;

const PREVIEW_CHARS: usize = 60;

pub fn run_status(services: &AppServices, state: &AppState, out: &mut impl Write) -> Result<()> {
    let progress = services.daily_progress(state);
    writeln!(out, "Streak: {} day(s)", progress.streak)?;
    writeln!(
        out,
        "Today:  {}/{} correct ({}%){}",
        progress.today_count,
        progress.daily_goal,
        progress.percent(),
        if progress.goal_met() { ", goal met" } else { "" }
    )?;
    writeln!(out)?;
    for subject in services.content().subject_overview(state) {
        writeln!(
            out,
            "  {:<12} {:<12} {} item(s)",
            subject.id, subject.name, subject.item_count
        )?;
    }
    Ok(())
}

pub fn run_list(state: &AppState, subject: &SubjectId, out: &mut impl Write) -> Result<()> {
    let items = state.list_items(subject);
    if items.is_empty() {
        writeln!(out, "No content for {subject} yet.")?;
    }
    for item in items {
        match item {
            ContentItem::Note(note) => writeln!(out, "[note]     {}", note.title)?,
            ContentItem::Question(question) => writeln!(
                out,
                "[question] {} ({})",
                question.preview(PREVIEW_CHARS),
                question.correct.display_letter()
            )?,
        }
    }
    Ok(())
}

pub async fn run_goal(
    services: &AppServices,
    state: &mut AppState,
    goal: u32,
    out: &mut impl Write,
) -> Result<()> {
    services
        .content()
        .set_daily_goal(state, goal)
        .await
        .context("update daily goal")?;
    writeln!(out, "Daily goal set to {goal}.")?;
    Ok(())
}

pub async fn run_add_note(
    services: &AppServices,
    state: &mut AppState,
    subject: &SubjectId,
    title: String,
    body: String,
    out: &mut impl Write,
) -> Result<()> {
    services
        .content()
        .add_note(state, subject, NoteDraft::new(title, body))
        .await
        .context("add note")?;
    writeln!(out, "Note saved to {subject}.")?;
    Ok(())
}

pub async fn run_add_question(
    services: &AppServices,
    state: &mut AppState,
    args: AddQuestionArgs,
    out: &mut impl Write,
) -> Result<()> {
    let draft = QuestionDraft {
        text: args.text,
        options: AnswerOptions::new(args.option_a, args.option_b, args.option_c, args.option_d),
        correct: args.correct,
        explanation: args.explanation,
    };
    let added = services
        .content()
        .add_question(state, &args.subject, draft)
        .await
        .context("add question")?;
    if let Some(over) = added.answer_key_override {
        writeln!(
            out,
            "Answer key found in the text: {} replaces {}.",
            over.detected.display_letter(),
            over.entered.display_letter()
        )?;
    }
    writeln!(out, "Question saved to {}.", args.subject)?;
    Ok(())
}

/// Inserts a handful of sample questions and notes.
pub async fn run_seed(
    services: &AppServices,
    state: &mut AppState,
    out: &mut impl Write,
) -> Result<()> {
    let content = services.content();
    let questions = [
        (
            "matematica",
            "Quanto é 7 x 8?",
            ["54", "56", "58", "64"],
            OptionLabel::B,
            "7 x 8 = 56.",
        ),
        (
            "fisica",
            "Qual é a unidade de força no SI? Gabarito: A",
            ["Newton", "Joule", "Watt", "Pascal"],
            OptionLabel::A,
            "",
        ),
        (
            "quimica",
            "Qual é o símbolo do sódio?",
            ["S", "So", "Na", "Sd"],
            OptionLabel::C,
            "Vem do latim natrium.",
        ),
        (
            "ingles",
            "Past tense of \"go\"?",
            ["goed", "gone", "going", "went"],
            OptionLabel::D,
            "",
        ),
    ];
    for (subject, text, [a, b, c, d], correct, explanation) in questions {
        let draft = QuestionDraft {
            text: text.to_owned(),
            options: AnswerOptions::new(a, b, c, d),
            correct: Some(correct),
            explanation: explanation.to_owned(),
        };
        content
            .add_question(state, &SubjectId::new(subject), draft)
            .await
            .with_context(|| format!("seed question for {subject}"))?;
    }
    content
        .add_note(
            state,
            &SubjectId::new("biologia"),
            NoteDraft::new("Mitocôndria", "Organela responsável pela respiração celular."),
        )
        .await
        .context("seed note")?;

    tracing::info!(questions = questions.len(), notes = 1, "sample content seeded");
    writeln!(out, "Seeded {} questions and 1 note.", questions.len())?;
    Ok(())
}

/// Runs one session, reading an answer letter per line from `input`.
///
/// Stops early when `input` ends.
pub async fn run_study(
    services: &AppServices,
    state: &mut AppState,
    scope: SessionScope,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let study = services.study_loop();
    let mut session = match study.start_session(state, scope) {
        Ok(session) => session,
        Err(SessionError::EmptyPool) => {
            writeln!(out, "No questions to study yet. Add some with `add-question`.")?;
            return Ok(());
        }
        Err(err) => return Err(err).context("start session"),
    };

    let mut line = String::new();
    'questions: while let Some(question) = session.current_question() {
        writeln!(
            out,
            "\n[{}/{}] {}",
            session.position() + 1,
            session.total_questions(),
            question.text
        )?;
        for (label, text) in question.options.iter() {
            if !text.trim().is_empty() {
                writeln!(out, "  {}) {text}", label.display_letter())?;
            }
        }

        let selected = loop {
            write!(out, "> ")?;
            out.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out, "\nSession stopped.")?;
                break 'questions;
            }
            match line.parse::<OptionLabel>() {
                Ok(label) => break label,
                Err(_) => writeln!(out, "Answer with a, b, c or d.")?,
            }
        };

        let feedback = study.answer_current(&mut session, state, selected).await?;
        if feedback.is_correct() {
            writeln!(out, "Correct!")?;
        } else {
            writeln!(
                out,
                "Wrong. The answer is {}.",
                feedback.correct.display_letter()
            )?;
        }
        writeln!(out, "{}", feedback.explanation)?;
        if let Some(goal) = feedback.goal_reached {
            writeln!(out, "Daily goal reached! Streak: {} day(s).", goal.streak)?;
        }

        if let AdvanceOutcome::Finished(summary) = study.advance(&mut session)? {
            writeln!(
                out,
                "\nSession finished: {}/{} correct.",
                summary.correct, summary.total
            )?;
        }
    }
    Ok(())
}
