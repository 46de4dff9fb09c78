use crate::infra::{seed_agents, seed_schemes, LoggingNotifier};
use clap::Args;
use solar_subsidy::access::{Caller, Role, UserId};
use solar_subsidy::config::AppConfig;
use solar_subsidy::error::AppError;
use solar_subsidy::workflows::applications::{
    AgentAssignment, ApplicantDetails, ApplicationLifecycleService, ApplicationRecord,
    ApplicationSubmission, InMemoryLifecycleStore, InstallationStatus, InstallationUpdate,
    Notification, NotificationError, NotificationPublisher, PropertyDetails, SchemeId,
};
use solar_subsidy::workflows::estimator::{
    estimate_for_region, EstimateView, InMemoryRegionCatalog, SizingInput,
};
use std::sync::{Arc, Mutex};

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// Average monthly electricity bill in rupees
    #[arg(long)]
    pub(crate) monthly_bill: f64,
    /// Usable shadow-free roof area in square feet
    #[arg(long)]
    pub(crate) roof_area: f64,
    /// State whose coefficients apply (defaults to APP_DEFAULT_REGION)
    #[arg(long)]
    pub(crate) state: Option<String>,
    /// Sanctioned connected load in kW, reported against the recommendation
    #[arg(long)]
    pub(crate) connected_load: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Monthly bill used for the demo household
    #[arg(long, default_value_t = 2400.0)]
    pub(crate) monthly_bill: f64,
    /// Roof area used for the demo household
    #[arg(long, default_value_t = 400.0)]
    pub(crate) roof_area: f64,
    /// State of the demo household (defaults to APP_DEFAULT_REGION)
    #[arg(long)]
    pub(crate) state: Option<String>,
}

/// Logs like the server does and keeps the short demo run's notifications for the summary.
#[derive(Default)]
struct DemoOutbox {
    sent: Mutex<Vec<Notification>>,
}

impl NotificationPublisher for DemoOutbox {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        LoggingNotifier.publish(notification.clone())?;
        self.sent
            .lock()
            .expect("outbox mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let region = args
        .state
        .unwrap_or_else(|| config.calculator.default_region.clone());

    let catalog = InMemoryRegionCatalog::with_defaults();
    let input = SizingInput {
        monthly_bill: args.monthly_bill,
        roof_area: args.roof_area,
        connected_load_kw: args.connected_load,
    };
    let result = estimate_for_region(&catalog, &region, &input)?;
    let rendered =
        serde_json::to_string_pretty(&EstimateView::from(&result)).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let region = args
        .state
        .unwrap_or_else(|| config.calculator.default_region.clone());

    println!("Rooftop solar subsidy demo");

    let catalog = InMemoryRegionCatalog::with_defaults();
    let sizing = estimate_for_region(
        &catalog,
        &region,
        &SizingInput::new(args.monthly_bill, args.roof_area),
    )?;
    let view = EstimateView::from(&sizing);
    println!("\nEstimate for {}", view.state);
    println!("  Recommended capacity: {:.2} kW", view.capacity);
    println!("  Roof area required:   {:.0} sq ft", view.area_required);
    println!("  Estimated cost:       Rs {:.2}", view.estimated_cost);
    println!("  Central subsidy:      Rs {:.2}", view.subsidy);
    println!("  Net cost:             Rs {:.2}", view.net_cost);
    println!("  Payback:              {:.2} years", view.roi);

    let store = Arc::new(InMemoryLifecycleStore::with_reference_data(
        seed_schemes(),
        seed_agents(),
    ));
    let notifier = Arc::new(DemoOutbox::default());
    let service = ApplicationLifecycleService::new(store, notifier.clone());

    let citizen = Caller::new("citizen-demo", Role::User);
    let admin = Caller::new("admin-demo", Role::Admin);
    let agent_id = UserId("agent-001".to_string());
    let agent = Caller::new(agent_id.0.clone(), Role::Agent);

    println!("\nApplication lifecycle");
    let submitted = service.submit(
        &citizen,
        ApplicationSubmission {
            scheme_id: SchemeId("SCH-001".to_string()),
            applicant: ApplicantDetails {
                full_name: "Demo Household".to_string(),
                phone: "+91-90000-00000".to_string(),
                email: None,
            },
            property: PropertyDetails {
                address: "12 Demo Street".to_string(),
                district: "Demo District".to_string(),
                state: view.state.clone(),
                roof_area_sqft: args.roof_area,
                monthly_bill: args.monthly_bill,
                consumer_number: None,
            },
            requested_capacity_kw: view.capacity.max(1.0),
        },
    )?;
    render_step("submitted", &submitted);

    let approved = service.approve(&admin, &submitted.id)?;
    render_step("approved", &approved);

    let (scheduled, installation) = service.assign_agent(
        &admin,
        &submitted.id,
        AgentAssignment {
            agent_id,
            scheduled_date: None,
        },
    )?;
    render_step("scheduled", &scheduled);

    if let Err(err) = service.approve(&admin, &submitted.id) {
        println!("  re-approval refused: {err}");
    }

    let (_, in_progress) = service.update_installation_status(
        &agent,
        &installation.id,
        InstallationUpdate::to(InstallationStatus::InProgress),
    )?;
    render_step("in progress", &in_progress);

    let (completed, installed) = service.update_installation_status(
        &agent,
        &installation.id,
        InstallationUpdate::to(InstallationStatus::Completed),
    )?;
    render_step("installed", &installed);
    if let Some(capacity) = completed.actual_capacity_kw {
        println!("  commissioned capacity: {capacity:.2} kW");
    }

    let sent = std::mem::take(&mut *notifier.sent.lock().expect("outbox mutex poisoned"));
    println!("\nNotifications ({})", sent.len());
    for notification in sent {
        println!(
            "  - {} -> {}",
            notification.template, notification.recipient
        );
    }

    Ok(())
}

fn render_step(label: &str, record: &ApplicationRecord) {
    println!(
        "  {:<12} {} [{}]",
        label,
        record.application_number,
        record.status.label()
    );
}
