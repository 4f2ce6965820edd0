//! Store behaviour against a real PostgreSQL database.
//!
//! These tests need a disposable database. To run them:
//! 1. Start PostgreSQL (e.g. `docker compose up -d postgres`)
//! 2. Set DATABASE_URL
//! 3. Run: cargo test -p booking-service -- --ignored

use chrono::{Duration, NaiveDate, NaiveTime};
use futures::future::join_all;
use uuid::Uuid;

use booking_service_lib::{
    BookingServiceConfig, Database, ServiceContainer, Services, SlotConfig,
};
use common::{AppError, DatabaseConfig};
use domain::{BlockingPolicy, Principal, Registration, ReservationDraft, MSG_SLOT_TAKEN};

async fn services(blocking: BlockingPolicy) -> Services {
    let config = BookingServiceConfig {
        database: DatabaseConfig::from_env().unwrap(),
        slots: SlotConfig {
            blocking,
            ..SlotConfig::default()
        },
    };
    let db = Database::connect(&config.database).await.unwrap();
    Services::from_connection(db.get_connection(), &config).unwrap()
}

async fn register(services: &Services, run: Uuid, n: usize) -> Principal {
    let user = services
        .users()
        .register(Registration {
            first_name: format!("Tester{}", n),
            last_name: "Postgres".to_string(),
            email: format!("pg{}-{}@x.cz", n, run),
            password: "pw1".to_string(),
        })
        .await
        .unwrap();
    Principal::from(&user)
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "Requires database"]
async fn overlapping_concurrent_bookings_admit_exactly_one() {
    let services = services(BlockingPolicy::Overlap).await;
    let run = Uuid::new_v4();
    let title = format!("Pool {}", run);

    let mut principals = Vec::new();
    for n in 0..8 {
        principals.push(register(&services, run, n).await);
    }

    // Every pair overlaps, but no two share a start time
    let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    let attempts = principals.iter().enumerate().map(|(n, who)| {
        let reservations = services.reservations();
        let start = nine + Duration::minutes(5 * n as i64);
        let draft =
            ReservationDraft::new(&title, date(), start, start + Duration::hours(1), None).unwrap();
        async move { reservations.create(who, draft).await }
    });
    let results = join_all(attempts).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == MSG_SLOT_TAKEN));
    }
    let available = services
        .slots()
        .available_slots(&title, date())
        .await
        .unwrap();
    assert!(available.len() < services.slots().generate_grid().len());

    for who in &principals {
        services.users().delete_by_id(who.user_id).await.unwrap();
    }
}

#[tokio::test]
#[ignore = "Requires database"]
async fn booking_for_a_deleted_owner_is_not_found() {
    let services = services(BlockingPolicy::Start).await;
    let run = Uuid::new_v4();
    let jana = register(&services, run, 0).await;

    services.users().delete_by_id(jana.user_id).await.unwrap();

    let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    let draft = ReservationDraft::new(
        &format!("Pool {}", run),
        date(),
        start,
        start + Duration::hours(1),
        None,
    )
    .unwrap();
    let result = services.reservations().create(&jana, draft).await;

    assert!(matches!(result, Err(AppError::NotFound)));
}
