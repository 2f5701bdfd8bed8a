use chrono::{Duration, Utc};
use uuid::Uuid;

use super::Blob;
use crate::models::job::{Job, JobStatus, VehicleType};

/// Starting data for a fresh or unreadable blob: two open hauls and one
/// finished one, so the board is not empty on first run.
pub fn initial_blob() -> Blob {
    let now = Utc::now();

    Blob {
        jobs: vec![
            Job {
                id: Uuid::from_u128(1),
                title: "Antique Oak Dresser".to_string(),
                description: "Heavy solid wood dresser. Needs two people or a dolly. I can help load.".to_string(),
                pickup_location: "123 Maple St, Downtown".to_string(),
                dropoff_location: "456 Oak Ln, Suburbs".to_string(),
                status: JobStatus::Pending,
                payout: 65.0,
                platform_fee: 10.0,
                vehicle_type: VehicleType::Pickup,
                image_url: Some("https://picsum.photos/400/300?random=1".to_string()),
                distance_miles: 12.0,
                fragility: None,
                handling_instructions: None,
                driver_confirmed: false,
                requester_confirmed: false,
                rating_for_driver: None,
                rating_for_requester: None,
                created_at: now - Duration::hours(1),
            },
            Job {
                id: Uuid::from_u128(2),
                title: "Free Sofa Bed".to_string(),
                description: "Good condition, just need it gone by Saturday. It is on the 2nd floor.".to_string(),
                pickup_location: "789 Pine Ave, Westside".to_string(),
                dropoff_location: "321 Elm St, Northside".to_string(),
                status: JobStatus::Pending,
                payout: 80.0,
                platform_fee: 12.0,
                vehicle_type: VehicleType::BoxTruck,
                image_url: Some("https://picsum.photos/400/300?random=2".to_string()),
                distance_miles: 8.0,
                fragility: None,
                handling_instructions: None,
                driver_confirmed: false,
                requester_confirmed: false,
                rating_for_driver: None,
                rating_for_requester: None,
                created_at: now - Duration::hours(2),
            },
            Job {
                id: Uuid::from_u128(3),
                title: "Garden Pavers (Leftover)".to_string(),
                description: "Stack of about 50 pavers. Easy pickup from driveway.".to_string(),
                pickup_location: "55 Garden Way".to_string(),
                dropoff_location: "888 River Rd".to_string(),
                status: JobStatus::Completed,
                payout: 45.0,
                platform_fee: 7.0,
                vehicle_type: VehicleType::Suv,
                image_url: Some("https://picsum.photos/400/300?random=3".to_string()),
                distance_miles: 5.0,
                fragility: None,
                handling_instructions: None,
                driver_confirmed: true,
                requester_confirmed: true,
                rating_for_driver: Some(5),
                rating_for_requester: None,
                created_at: now - Duration::days(2),
            },
        ],
        users: Vec::new(),
    }
}
