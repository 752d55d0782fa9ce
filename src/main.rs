//! Demo binary: walks the purchase workflow end to end against the
//! configured backend, tolerating an unreachable one.

use ingressou::config::Config;
use ingressou::gateway::HttpGateway;
use ingressou::purchase::{PurchaseAction, PurchaseEnvironment, PurchaseReducer, PurchaseState};
use ingressou::store::Store;
use ingressou::types::order_total_reais;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    tracing::info!(base_url = %config.api.base_url, "starting purchase demo");

    let sessions = config.session_store();
    let session = sessions.load()?;
    if session.is_logged_in() {
        tracing::info!(is_admin = session.is_admin, "restored session");
    } else {
        tracing::info!("no stored session, running logged out");
    }

    let gateway = Arc::new(HttpGateway::from_config(&config.api)?);
    let store = Store::new(
        PurchaseState::default(),
        PurchaseReducer,
        PurchaseEnvironment { gateway, session },
    );

    for (name, birth_date) in [("Maria Silva", "01/02/1990"), ("João Souza", "15/07/1985")] {
        store.send(PurchaseAction::SetName(name.to_owned())).await;
        store
            .send(PurchaseAction::SetBirthDate(birth_date.to_owned()))
            .await;
        store
            .send(PurchaseAction::SetMaritalStatus("Solteiro(a)".to_owned()))
            .await;
        store.send(PurchaseAction::AddAttendee).await;
    }

    let (count, error) = store
        .state(|s| (s.order.len(), s.form_error.clone()))
        .await;
    if let Some(error) = error {
        tracing::error!(%error, "attendee form rejected");
        return Ok(());
    }
    tracing::info!(
        attendees = count,
        total_reais = order_total_reais(count),
        "order built"
    );

    store.send(PurchaseAction::Advance).await;
    store.send(PurchaseAction::Advance).await;

    let settled = store
        .send_and_wait_for(
            PurchaseAction::Pay,
            |action| matches!(action, PurchaseAction::PaymentSettled { .. }),
            Duration::from_secs(15),
        )
        .await;

    match settled {
        Ok(PurchaseAction::PaymentSettled { success }) => {
            let dialog = store.state(|s| s.dialog.clone()).await;
            if let Some(dialog) = dialog {
                tracing::info!(success, message = %dialog.message, "payment settled");
            }
        }
        Ok(_) => {}
        Err(err) => tracing::error!(error = %err, "payment did not settle in time"),
    }

    Ok(())
}
