#![allow(dead_code)]

//! Shared test harness: in-memory stores, mock senders, and fully wired
//! services.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use careminder_channel::{ChannelSender, MockSender};
use careminder_core::config::channels::ChannelsConfig;
use careminder_core::config::clinic::ClinicConfig;
use careminder_core::config::delivery::DeliveryConfig;
use careminder_database::memory::{
    MemoryAppointmentStore, MemoryDeliveryStore, MemoryPatientStore, MemoryReminderStore,
};
use careminder_database::store::{
    AppointmentStore, DeliveryStore, PatientStore, ReminderStore,
};
use careminder_entity::appointment::{Appointment, AppointmentStatus};
use careminder_entity::delivery::DeliveryChannel;
use careminder_entity::patient::Patient;
use careminder_entity::reminder::{Reminder, ReminderKind, ReminderStatus};
use careminder_service::cycle::DailyCycleService;
use careminder_service::dispatch::{DeliveryDispatcher, SenderRegistry};
use careminder_service::health::HealthCheckService;
use careminder_service::hooks::AppointmentLifecycle;
use careminder_service::schedule::ReminderScheduler;

/// Fully wired service stack over in-memory stores and mock senders.
pub struct TestHarness {
    pub appointments: Arc<MemoryAppointmentStore>,
    pub patients: Arc<MemoryPatientStore>,
    pub reminders: Arc<MemoryReminderStore>,
    pub deliveries: Arc<MemoryDeliveryStore>,
    pub line: Arc<MockSender>,
    pub email: Arc<MockSender>,
    pub sms: Arc<MockSender>,
    pub scheduler: Arc<ReminderScheduler>,
    pub dispatcher: Arc<DeliveryDispatcher>,
    pub cycle: DailyCycleService,
    pub health: HealthCheckService,
    pub lifecycle: AppointmentLifecycle,
}

impl TestHarness {
    /// Harness with every channel configured and succeeding.
    pub fn new() -> Self {
        Self::with_senders(
            MockSender::new(DeliveryChannel::Line),
            MockSender::new(DeliveryChannel::Email),
            MockSender::new(DeliveryChannel::Sms),
        )
    }

    /// Harness with caller-controlled senders.
    pub fn with_senders(line: MockSender, email: MockSender, sms: MockSender) -> Self {
        let appointments = Arc::new(MemoryAppointmentStore::new());
        let patients = Arc::new(MemoryPatientStore::new());
        let reminders = Arc::new(MemoryReminderStore::new());
        let deliveries = Arc::new(MemoryDeliveryStore::new());

        let line = Arc::new(line);
        let email = Arc::new(email);
        let sms = Arc::new(sms);

        let mut registry = SenderRegistry::new();
        registry.register(Arc::clone(&line) as Arc<dyn ChannelSender>);
        registry.register(Arc::clone(&email) as Arc<dyn ChannelSender>);
        registry.register(Arc::clone(&sms) as Arc<dyn ChannelSender>);
        let registry = Arc::new(registry);

        let appointment_store: Arc<dyn AppointmentStore> =
            Arc::clone(&appointments) as Arc<dyn AppointmentStore>;
        let patient_store: Arc<dyn PatientStore> =
            Arc::clone(&patients) as Arc<dyn PatientStore>;
        let reminder_store: Arc<dyn ReminderStore> =
            Arc::clone(&reminders) as Arc<dyn ReminderStore>;
        let delivery_store: Arc<dyn DeliveryStore> =
            Arc::clone(&deliveries) as Arc<dyn DeliveryStore>;

        let delivery_config = DeliveryConfig::default();
        let scheduler = Arc::new(ReminderScheduler::new(Arc::clone(&reminder_store)));
        let dispatcher = Arc::new(DeliveryDispatcher::new(
            Arc::clone(&reminder_store),
            Arc::clone(&delivery_store),
            Arc::clone(&appointment_store),
            Arc::clone(&patient_store),
            Arc::clone(&registry),
            ClinicConfig::default(),
            &delivery_config,
        ));
        let cycle = DailyCycleService::new(
            Arc::clone(&appointment_store),
            Arc::clone(&reminder_store),
            Arc::clone(&scheduler),
            Arc::clone(&dispatcher),
            100,
        );
        let health = HealthCheckService::new(
            Arc::clone(&reminder_store),
            Arc::clone(&delivery_store),
            Arc::clone(&dispatcher),
            ChannelsConfig::default(),
            delivery_config,
            100,
        );
        let lifecycle = AppointmentLifecycle::new(Arc::clone(&scheduler));

        Self {
            appointments,
            patients,
            reminders,
            deliveries,
            line,
            email,
            sms,
            scheduler,
            dispatcher,
            cycle,
            health,
            lifecycle,
        }
    }

    /// Seed a patient reachable on every channel.
    pub async fn seed_patient(&self) -> Patient {
        self.seed_patient_with(
            Some("U-line-1"),
            Some("patient@example.com"),
            Some("+819012345678"),
            None,
        )
        .await
    }

    /// Seed a patient with specific contact fields.
    pub async fn seed_patient_with(
        &self,
        line: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        preferred: Option<DeliveryChannel>,
    ) -> Patient {
        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4(),
            name: "Suzuki Ichiro".to_string(),
            line_user_id: line.map(String::from),
            email: email.map(String::from),
            phone: phone.map(String::from),
            preferred_contact_method: preferred,
            created_at: now,
            updated_at: now,
        };
        self.patients.put(patient.clone()).await;
        patient
    }

    /// Seed a booked appointment for a patient.
    pub async fn seed_appointment(
        &self,
        patient_id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Appointment {
        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id,
            scheduled_at,
            status: AppointmentStatus::Booked,
            treatment_type: Some("checkup".to_string()),
            created_at: now,
            updated_at: now,
        };
        self.appointments.put(appointment.clone()).await;
        appointment
    }

    /// Insert a pending reminder row directly, bypassing the scheduler's
    /// future-date guard (for exercising due reminders).
    pub async fn insert_pending_reminder(
        &self,
        appointment_id: Uuid,
        kind: ReminderKind,
        scheduled_at: DateTime<Utc>,
        message_content: Option<&str>,
    ) -> Reminder {
        let now = Utc::now();
        let reminder = Reminder {
            id: Uuid::new_v4(),
            appointment_id,
            kind,
            scheduled_at,
            status: ReminderStatus::Pending,
            retry_count: 0,
            next_retry_at: None,
            error_message: None,
            message_content: message_content.map(String::from),
            sent_at: None,
            created_at: now,
            updated_at: now,
        };
        self.reminders
            .insert(&reminder)
            .await
            .expect("insert reminder");
        reminder
    }
}
