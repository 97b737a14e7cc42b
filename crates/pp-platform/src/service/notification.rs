//! Notification Service
//!
//! In-app notifications raised as a side-effect of contract, invoice,
//! marketplace and messaging actions.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{Application, Contract, Invoice, Message, Notification, NotificationKind, Opportunity};
use crate::repository::NotificationRepository;

#[derive(Clone)]
pub struct NotificationService {
    repo: Arc<NotificationRepository>,
}

impl NotificationService {
    pub fn new(repo: Arc<NotificationRepository>) -> Self {
        Self { repo }
    }

    pub async fn contract_sent(&self, contract: &Contract) {
        let n = Notification::new(
            &contract.sponsor_id,
            NotificationKind::ContractSent,
            "Contract ready for signature",
            format!("Contract '{}' has been sent to you for signature", contract.title),
        )
        .for_entity("Contract", &contract.id);
        self.notify(n).await
    }

    pub async fn contract_signed(&self, contract: &Contract) {
        let signer = contract.signed_by.as_deref().unwrap_or("the sponsor");
        let n = Notification::new(
            &contract.club_id,
            NotificationKind::ContractSigned,
            "Contract signed",
            format!("Contract '{}' was signed by {}", contract.title, signer),
        )
        .for_entity("Contract", &contract.id);
        self.notify(n).await
    }

    pub async fn invoice_sent(&self, invoice: &Invoice) {
        let n = Notification::new(
            &invoice.sponsor_id,
            NotificationKind::InvoiceSent,
            "New invoice",
            format!("Invoice {} has been issued to you", invoice.invoice_number),
        )
        .for_entity("Invoice", &invoice.id);
        self.notify(n).await
    }

    pub async fn application_received(&self, opportunity: &Opportunity, application: &Application) {
        let n = Notification::new(
            &opportunity.club_id,
            NotificationKind::ApplicationReceived,
            "New application",
            format!("A sponsor applied to '{}'", opportunity.title),
        )
        .for_entity("Application", &application.id);
        self.notify(n).await
    }

    pub async fn application_decided(&self, opportunity: &Opportunity, application: &Application) {
        let n = Notification::new(
            &application.sponsor_id,
            NotificationKind::ApplicationDecided,
            format!("Application {}", application.status),
            format!("Your application to '{}' was {}", opportunity.title, application.status),
        )
        .for_entity("Application", &application.id);
        self.notify(n).await
    }

    pub async fn message_received(&self, message: &Message, sender_name: &str) {
        let n = Notification::new(
            &message.recipient_id,
            NotificationKind::MessageReceived,
            "New message",
            format!("You have a new message from {}", sender_name),
        )
        .for_entity("Message", &message.id);
        self.notify(n).await
    }

    async fn notify(&self, notification: Notification) {
        debug!(
            account_id = %notification.account_id,
            kind = %notification.kind,
            "Notification raised"
        );
        if let Err(e) = self.repo.insert(&notification).await {
            warn!(error = %e, kind = %notification.kind, "Failed to store notification");
        }
    }
}
