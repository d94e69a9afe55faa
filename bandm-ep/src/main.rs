//! bandm-ep (Escalation Planner) - command-line front end
//!
//! Thin shell over the planner library: resolves configuration, builds the
//! HTTP collaborator and runs one planning operation per invocation.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use bandm_common::config::{ConfigOverrides, ConfigResolver, RankingPolicy};
use bandm_common::models::{Escalation, Event, EventFilter};
use bandm_common::{time, Id};
use bandm_ep::scale_status;
use bandm_ep::{BandApi, EscalationDraft, HttpBandApi, PlanningSession, SessionContext};

#[derive(Parser, Debug)]
#[command(name = "bandm-ep")]
#[command(about = "Escalation planner for band events")]
#[command(version)]
struct Args {
    /// Backend base URL
    #[arg(long, env = "BANDM_API_URL")]
    api_url: Option<String>,

    /// Bearer token for the backend
    #[arg(long, env = "BANDM_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Band being planned
    #[arg(long, env = "BANDM_BAND")]
    band: String,

    /// User id of the person planning
    #[arg(long, env = "BANDM_VIEWER")]
    viewer: String,

    /// Plan as a band administrator
    #[arg(long)]
    admin: bool,

    /// Member ranking policy (rank-all, restrict-and-list)
    #[arg(long)]
    policy: Option<RankingPolicy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the confirmed roster of an event
    Roster {
        #[arg(long)]
        event: String,
    },
    /// Apply the event's lineup and print staged suggestions with candidates
    Suggest {
        #[arg(long)]
        event: String,
    },
    /// Escalate a member for a role
    Assign {
        #[arg(long)]
        event: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        user: String,
    },
    /// Remove an escalation
    Unassign {
        #[arg(long)]
        event: String,
        #[arg(long)]
        escalation: String,
    },
    /// Next event, its status and your upcoming assignments
    Dashboard {
        #[arg(long, default_value = "future")]
        filter: EventFilter,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        api_base_url: args.api_url.clone(),
        api_token: args.token.clone(),
        ranking_policy: args.policy,
        log_level: None,
    };
    let config = ConfigResolver::new().resolve(&overrides)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .init();

    info!(
        "Starting bandm-ep v{} against {}",
        env!("CARGO_PKG_VERSION"),
        config.api_base_url
    );

    let api: Arc<dyn BandApi> = Arc::new(HttpBandApi::from_config(&config)?);
    let ctx = SessionContext::new(Id::parse(&args.band)?, Id::parse(&args.viewer)?, args.admin);

    match args.command {
        Command::Roster { event } => {
            let session = open(api, ctx, &event, config.ranking_policy).await?;
            print_roster(&session);
            session.close();
        }
        Command::Suggest { event } => {
            let mut session = open(api, ctx, &event, config.ranking_policy).await?;
            if let Some(lineup) = session.lineup() {
                let roles: Vec<&str> = lineup.role_slots.iter().map(|s| s.role.name.as_str()).collect();
                println!("Lineup {}: {}", lineup.name, roles.join(", "));
            }
            let outcome = session.apply_lineup().await?;
            println!("{outcome:?}");
            for item in session.staged() {
                let candidates = session.candidates(&item.key)?;
                let names: Vec<&str> = candidates.iter().map(|m| m.name.as_str()).collect();
                println!("  [{}] {}: {}", item.key, item.role_name, names.join(", "));
            }
            session.close();
        }
        Command::Assign { event, role, user } => {
            let mut session = open(api, ctx, &event, config.ranking_policy).await?;
            let draft = EscalationDraft::new(Id::parse_optional(&role), Id::parse_optional(&user));
            let created = session.add_manual(&draft).await?;
            println!("Escalated {} as {} ({})", created.user.name, created.role.name, created.id);
            print_roster(&session);
            session.close();
        }
        Command::Unassign { event, escalation } => {
            let mut session = open(api, ctx, &event, config.ranking_policy).await?;
            session.remove(&Id::parse(&escalation)?).await?;
            print_roster(&session);
            session.close();
        }
        Command::Dashboard { filter } => dashboard(api.as_ref(), &ctx, filter).await?,
    }

    Ok(())
}

async fn find_event(api: &dyn BandApi, ctx: &SessionContext, event_id: &Id) -> Result<Event> {
    api.list_band_events(&ctx.band_id, Some(EventFilter::All))
        .await?
        .into_iter()
        .find(|e| &e.id == event_id)
        .ok_or_else(|| anyhow!("event {event_id} not found in band {}", ctx.band_id))
}

async fn open(
    api: Arc<dyn BandApi>,
    ctx: SessionContext,
    event_id: &str,
    policy: RankingPolicy,
) -> Result<PlanningSession> {
    let event_id = Id::parse(event_id)?;
    let event = find_event(api.as_ref(), &ctx, &event_id).await?;
    PlanningSession::open(api, ctx, event, policy)
        .await
        .with_context(|| format!("opening planner for event {event_id}"))
}

fn print_roster(session: &PlanningSession) {
    let event = session.event();
    let report = session.report();
    println!(
        "{} ({}) - {:?}, {} missing",
        event.name,
        event.starting_time.format("%Y-%m-%d %H:%M"),
        report.status,
        report.missing_count
    );
    for esc in session.roster() {
        println!("  {:<20} {} [{}]", esc.role.name, esc.user.name, esc.id);
    }
}

async fn dashboard(api: &dyn BandApi, ctx: &SessionContext, filter: EventFilter) -> Result<()> {
    let now = time::now();
    let mut events = api.list_band_events(&ctx.band_id, Some(filter)).await?;
    scale_status::sort_events(&mut events);

    let mut escalations: Vec<Escalation> = Vec::new();
    if !ctx.viewer_is_admin {
        for event in events.iter().filter(|e| e.starting_time > now) {
            escalations.extend(api.list_escalations(&event.id).await?);
        }
    }

    let summary = scale_status::dashboard(&events, &escalations, ctx, now);
    match (&summary.next_event, summary.next_event_status) {
        (Some(next), Some(report)) => println!(
            "Next: {} at {} ({:?})",
            next.name,
            next.starting_time.format("%Y-%m-%d %H:%M"),
            report.status
        ),
        _ => println!("No upcoming events"),
    }
    println!("Future events: {}", summary.future_events);
    for assignment in &summary.my_assignments {
        println!(
            "  {} - {} as {}",
            assignment.event.starting_time.format("%Y-%m-%d %H:%M"),
            assignment.event.name,
            assignment.role.name
        );
    }
    Ok(())
}
