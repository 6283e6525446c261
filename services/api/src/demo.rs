use crate::infra::{InMemoryCrm, RecordingTransport};
use clap::Args;
use lead_intake::config::load_routing_config;
use lead_intake::error::AppError;
use lead_intake::workflows::leads::{
    Channel, ChannelOutcome, CrmSyncStatus, EstimateInput, FlagInput, IntakeError, IntakeOutcome,
    LeadForm, LeadIntakeService, NotificationDispatcher, RecordKind, RoutingConfig, RoutingEngine,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub(crate) struct RouteArgs {
    /// Lead form as JSON (same shape the intake endpoints accept)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Routing table to score against (defaults to the built-in roster and weights)
    #[arg(long)]
    pub(crate) routing_config: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Routing table to score against (defaults to the built-in roster and weights)
    #[arg(long)]
    pub(crate) routing_config: Option<PathBuf>,
    /// Print every rendered notification body, not just subjects.
    #[arg(long)]
    pub(crate) show_messages: bool,
}

pub(crate) fn run_route(args: RouteArgs) -> Result<(), AppError> {
    let RouteArgs {
        input,
        routing_config,
    } = args;

    let raw = std::fs::read_to_string(&input)?;
    let form: LeadForm = serde_json::from_str(&raw)?;
    let (_, submission) = form.into_parts().map_err(IntakeError::from)?;

    let engine = RoutingEngine::new(resolve_routing(routing_config)?);
    let routing = engine.process_lead(&submission);
    println!("{}", serde_json::to_string_pretty(&routing)?);
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        routing_config,
        show_messages,
    } = args;

    let transports: Vec<RecordingTransport> = Channel::ALL
        .iter()
        .map(|channel| RecordingTransport::new(*channel))
        .collect();
    let dispatcher = transports.iter().fold(
        NotificationDispatcher::new(Duration::from_secs(1)),
        |dispatcher, transport| dispatcher.with_transport(Arc::new(transport.clone())),
    );
    let crm = InMemoryCrm::default();
    let service = LeadIntakeService::new(
        Arc::new(crm.clone()),
        resolve_routing(routing_config)?,
        dispatcher,
    );

    println!("Lead intake demo");
    for (label, kind, form) in sample_leads() {
        match service.submit(kind, form).await {
            Ok(outcome) => render_outcome(label, &outcome, &crm),
            Err(err) => println!("- {label}: rejected ({err})"),
        }
    }

    println!("\nMessages captured per channel:");
    for transport in &transports {
        let messages = transport.messages();
        let Some(first) = messages.first() else {
            continue;
        };
        println!("- {}: {} message(s)", first.channel, messages.len());
        for message in &messages {
            let recipient = message.recipient.as_deref().unwrap_or("staff");
            println!("    [{}] {} -> {}", message.record_id, message.subject, recipient);
            if show_messages {
                for line in message.body.lines() {
                    println!("      | {line}");
                }
            }
        }
    }

    Ok(())
}

fn resolve_routing(path: Option<PathBuf>) -> Result<RoutingConfig, AppError> {
    match path {
        Some(path) => Ok(load_routing_config(path)?),
        None => Ok(RoutingConfig::default()),
    }
}

fn render_outcome(label: &str, outcome: &IntakeOutcome, crm: &InMemoryCrm) {
    let record = &outcome.lead.record;
    let routing = &outcome.lead.routing;
    println!(
        "\n- {label}: {} {} -> {} (score {})",
        record.kind.label(),
        record.id,
        routing.priority,
        routing.score
    );
    println!("  Owner: {}", routing.assigned_rep.label());
    println!("  Workflows: {}", routing.workflows_triggered.join(", "));
    println!("  Score components:");
    for component in &routing.components {
        println!(
            "    - {:?}: {} ({})",
            component.factor, component.points, component.notes
        );
    }

    println!("  Notifications:");
    for channel_outcome in &outcome.notifications.outcomes {
        match channel_outcome {
            ChannelOutcome::Sent {
                channel,
                elapsed_ms,
            } => println!("    - {channel}: sent in {elapsed_ms} ms"),
            ChannelOutcome::Failed { channel, reason } => {
                println!("    - {channel}: failed ({reason})")
            }
            ChannelOutcome::TimedOut { channel, after_ms } => {
                println!("    - {channel}: timed out after {after_ms} ms")
            }
            ChannelOutcome::Skipped { channel, reason } => {
                println!("    - {channel}: skipped ({reason})")
            }
        }
    }
    if let Some(err) = &outcome.notifications.error {
        println!("    - dispatch rejected: {err}");
    }

    match &outcome.crm_sync {
        CrmSyncStatus::Synced => match crm.fetch(&record.id) {
            Some(stored) => println!(
                "  CRM: {} \"{}\" synced at {}",
                stored.kind.label(),
                stored.draft.title(stored.kind),
                stored.last_modified.to_rfc3339()
            ),
            None => println!("  CRM: record missing after sync"),
        },
        CrmSyncStatus::Failed { reason } => {
            println!("  CRM: routing write-back failed ({reason})")
        }
    }
}

fn sample_leads() -> Vec<(&'static str, RecordKind, LeadForm)> {
    let gutter_refresh = LeadForm {
        name: "Morgan Lee".to_string(),
        email: "morgan@example.com".to_string(),
        phone: Some("515-555-0108".to_string()),
        address: Some("410 Elm St, Ankeny, IA".to_string()),
        property_type: Some("single_family".to_string()),
        services: vec!["gutters".to_string()],
        estimate_min: Some(EstimateInput::Text("$1,200".to_string())),
        estimate_max: Some(EstimateInput::Text("$2,400".to_string())),
        timeline: Some("this summer".to_string()),
        ..LeadForm::default()
    };

    let warehouse_reroof = LeadForm {
        name: "Harbor Logistics".to_string(),
        email: "facilities@harborlogistics.example".to_string(),
        phone: Some("515-555-0177".to_string()),
        address: Some("9 Industrial Pkwy, Des Moines, IA".to_string()),
        property_type: Some("warehouse".to_string()),
        services: vec![
            "commercial-roofing".to_string(),
            "coatings".to_string(),
            "gutters".to_string(),
        ],
        estimate_min: Some(EstimateInput::Amount(85_000.0)),
        estimate_max: Some(EstimateInput::Text("140k".to_string())),
        timeline: Some("next quarter".to_string()),
        ..LeadForm::default()
    };

    let storm_leak = LeadForm {
        name: "Dana Whitfield".to_string(),
        email: "dana@example.com".to_string(),
        phone: Some("515-555-0142".to_string()),
        address: Some("1200 Grand Ave, Des Moines, IA".to_string()),
        services: vec!["storm-damage".to_string(), "roofing".to_string()],
        timeline: Some("ASAP".to_string()),
        description: Some("Hail last night, water through the bedroom ceiling".to_string()),
        is_emergency: Some(FlagInput::Flag(true)),
        ..LeadForm::default()
    };

    vec![
        ("Gutter replacement estimate", RecordKind::Deal, gutter_refresh),
        ("Warehouse re-roof estimate", RecordKind::Deal, warehouse_reroof),
        ("Storm leak service call", RecordKind::Ticket, storm_leak),
    ]
}
