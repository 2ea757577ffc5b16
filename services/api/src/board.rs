use chrono::NaiveDate;
use clap::{Args, Subcommand};
use job_tracker::board::{
    Board, BoardSync, CandidateApi, CandidateCard, Column, DragEffect, DragLocation, DragOutcome,
    HttpCandidateApi, PipelineAnalytics, SearchFilter, StageFilter, WriteOutcome,
};
use job_tracker::candidates::{parse_date, CandidateDraft, ExperienceField, Stage, StageCount};
use job_tracker::config::AppConfig;
use job_tracker::error::AppError;
use job_tracker::telemetry;

const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Subcommand, Debug)]
pub(crate) enum BoardCommand {
    /// Print every column, the pipeline analytics and an optional filtered list
    Show(ShowArgs),
    /// Drag one card and print the reconciled board
    Drag(DragArgs),
    /// Submit a new candidate
    Add(AddArgs),
    /// Print the server-side stage aggregation
    Stages(ApiArgs),
}

#[derive(Args, Debug)]
pub(crate) struct ApiArgs {
    /// Base URL of a running tracker service
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub(crate) api_url: String,
}

#[derive(Args, Debug)]
pub(crate) struct ShowArgs {
    #[command(flatten)]
    pub(crate) api: ApiArgs,
    /// Case-insensitive match against name, role or company
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Restrict the filtered list to one stage ("all" for every stage)
    #[arg(long)]
    pub(crate) stage: Option<StageFilter>,
}

#[derive(Args, Debug)]
pub(crate) struct DragArgs {
    #[command(flatten)]
    pub(crate) api: ApiArgs,
    /// Source position as STAGE:INDEX
    #[arg(long, value_parser = parse_location)]
    pub(crate) from: DragLocation,
    /// Drop position as STAGE:INDEX; omit to drop outside every column
    #[arg(long, value_parser = parse_location)]
    pub(crate) to: Option<DragLocation>,
}

#[derive(Args, Debug)]
pub(crate) struct AddArgs {
    #[command(flatten)]
    pub(crate) api: ApiArgs,
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) company: String,
    #[arg(long)]
    pub(crate) role: String,
    /// Application date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) applied_date: NaiveDate,
    /// Initial stage; the service defaults to Applied
    #[arg(long)]
    pub(crate) stage: Option<Stage>,
    /// Years of experience
    #[arg(long)]
    pub(crate) experience: Option<f64>,
    #[arg(long)]
    pub(crate) resume_link: Option<String>,
}

impl AddArgs {
    fn draft(&self) -> CandidateDraft {
        CandidateDraft {
            name: self.name.clone(),
            company: self.company.clone(),
            role: self.role.clone(),
            current_stage: self.stage.map(|stage| stage.label().to_string()),
            applied_date: Some(self.applied_date),
            years_of_experience: self.experience.map(ExperienceField::from),
            resume_link: self.resume_link.clone(),
        }
    }
}

pub(crate) fn parse_location(raw: &str) -> Result<DragLocation, String> {
    let (column, index) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected STAGE:INDEX, got `{raw}`"))?;

    let column = if column.trim().eq_ignore_ascii_case(Column::Unassigned.label()) {
        Column::Unassigned
    } else {
        Column::Stage(column.trim().parse::<Stage>().map_err(|err| err.to_string())?)
    };
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|err| format!("invalid index `{index}`: {err}"))?;

    Ok(DragLocation::new(column, index))
}

pub(crate) async fn run_board(command: BoardCommand) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match command {
        BoardCommand::Show(args) => {
            let mut sync = BoardSync::new(HttpCandidateApi::new(args.api.api_url));
            sync.load().await?;

            print_lines(render_board(sync.board()));
            print_lines(render_analytics(&sync.analytics()));

            if args.search.is_some() || args.stage.is_some() {
                let filter = SearchFilter::new(
                    args.search.unwrap_or_default(),
                    args.stage.unwrap_or_default(),
                );
                print_lines(render_matches(&sync.filtered(&filter)));
            }
        }
        BoardCommand::Drag(args) => {
            let mut sync = BoardSync::new(HttpCandidateApi::new(args.api.api_url));
            sync.load().await?;

            let effect = sync
                .drag_end(DragOutcome {
                    source: args.from,
                    destination: args.to,
                })
                .await?;

            println!("{}", describe_effect(&effect));
            print_lines(render_board(sync.board()));
        }
        BoardCommand::Add(args) => {
            let draft = args.draft();
            let mut sync = BoardSync::new(HttpCandidateApi::new(args.api.api_url));
            let created = sync.submit(&draft).await?;

            println!(
                "Added {} ({}) as {} [{}]",
                created.name, created.id, created.role, created.current_stage
            );
            print_lines(render_board(sync.board()));
        }
        BoardCommand::Stages(args) => {
            let api = HttpCandidateApi::new(args.api_url);
            let counts = api.stage_counts().await?;
            print_lines(render_stage_counts(&counts));
        }
    }

    Ok(())
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

fn card_line(index: usize, card: &CandidateCard) -> String {
    let mut line = format!(
        "  {index}. {} | {} @ {} | {} years",
        card.name,
        card.role,
        card.company,
        experience_label(card.years_of_experience.as_ref())
    );
    if let Some(link) = card.resume_link.as_deref().filter(|link| !link.is_empty()) {
        line.push_str(" | resume: ");
        line.push_str(link);
    }
    line
}

// Zero, blank and missing values all render as N/A.
fn experience_label(field: Option<&ExperienceField>) -> String {
    match field {
        Some(ExperienceField::Number(years)) if *years != 0.0 => years.to_string(),
        Some(ExperienceField::Text(text)) if !text.trim().is_empty() && text.trim() != "0" => {
            text.trim().to_string()
        }
        _ => "N/A".to_string(),
    }
}

pub(crate) fn render_board(board: &Board) -> Vec<String> {
    let mut lines = Vec::new();
    for (column, cards) in board.columns() {
        lines.push(format!("{column} ({})", cards.len()));
        lines.extend(
            cards
                .iter()
                .enumerate()
                .map(|(index, card)| card_line(index, card)),
        );
    }
    lines
}

pub(crate) fn render_analytics(analytics: &PipelineAnalytics) -> Vec<String> {
    let mut lines = vec!["\nCandidates by stage".to_string()];
    lines.extend(
        analytics
            .stage_counts
            .iter()
            .map(|tally| format!("- {}: {}", tally.stage, tally.count)),
    );

    lines.push("\nCandidates by role".to_string());
    lines.extend(
        analytics
            .role_counts
            .iter()
            .map(|tally| format!("- {}: {}", tally.role, tally.count)),
    );

    lines.push(format!(
        "\nAverage experience: {}",
        analytics.average_experience
    ));
    lines
}

pub(crate) fn render_matches(cards: &[&CandidateCard]) -> Vec<String> {
    if cards.is_empty() {
        return vec!["\nMatching candidates: none".to_string()];
    }

    let mut lines = vec![format!("\nMatching candidates ({})", cards.len())];
    lines.extend(cards.iter().map(|card| {
        format!(
            "- {} | {} @ {} [{}]",
            card.name, card.role, card.company, card.current_stage
        )
    }));
    lines
}

pub(crate) fn render_stage_counts(counts: &[StageCount]) -> Vec<String> {
    if counts.is_empty() {
        return vec!["No candidates recorded".to_string()];
    }
    counts
        .iter()
        .map(|row| format!("- {}: {}", row.stage, row.count))
        .collect()
}

pub(crate) fn describe_effect(effect: &DragEffect) -> String {
    match effect {
        DragEffect::Ignored => "Dropped outside the board; nothing changed".to_string(),
        DragEffect::Reordered => "Reordered within the column (not persisted)".to_string(),
        DragEffect::Moved {
            change,
            write,
            reconciled,
        } => {
            let write = match write {
                WriteOutcome::Confirmed => "saved",
                WriteOutcome::Rejected => "rejected by the server",
                WriteOutcome::Abandoned => "not delivered",
            };
            let refresh = if *reconciled {
                "board refreshed"
            } else {
                "board not refreshed"
            };
            format!(
                "Moved {} to {}: {write}, {refresh}",
                change.candidate_id, change.stage
            )
        }
    }
}
