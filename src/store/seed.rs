use crate::models::{Booking, BookingStatus};

/// Engagements that were already confirmed before the site existed. These are
/// never written to storage: `get_bookings` merges them in front of the user
/// records on every read, and `save_bookings` filters their ids back out.
pub fn pre_existing_bookings() -> Vec<Booking> {
    vec![
        Booking {
            id: "pre-1".to_string(),
            client_name: "Festa aniversário d'Os Lagoias".to_string(),
            client_email: "contato@oslagoias.pt".to_string(),
            client_phone: "912 345 678".to_string(),
            event_date: "2025-07-12".to_string(),
            event_type: "Festa de Aniversário".to_string(),
            venue: "Portalegre".to_string(),
            duration: 90,
            budget: "2500".to_string(),
            message: "Festa de aniversário especial".to_string(),
            status: BookingStatus::Booked,
            proposal_sent: true,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        },
        Booking {
            id: "pre-2".to_string(),
            client_name: "Festas em Honra de Nª Srª da Alegria".to_string(),
            client_email: "festas@alegrete.pt".to_string(),
            client_phone: "913 456 789".to_string(),
            event_date: "2025-08-14".to_string(),
            event_type: "Festival".to_string(),
            venue: "Alegrete".to_string(),
            duration: 60,
            budget: "3000".to_string(),
            message: "Festas tradicionais de Alegrete".to_string(),
            status: BookingStatus::Booked,
            proposal_sent: true,
            created_at: "2024-01-02T00:00:00.000Z".to_string(),
        },
        Booking {
            id: "pre-3".to_string(),
            client_name: "Evento Casa Branca".to_string(),
            client_email: "eventos@casabranca.pt".to_string(),
            client_phone: "914 567 890".to_string(),
            event_date: "2025-08-15".to_string(),
            event_type: "Celebração Familiar".to_string(),
            venue: "Casa Branca (Sousel)".to_string(),
            duration: 60,
            budget: "2000".to_string(),
            message: "Celebração especial em Casa Branca".to_string(),
            status: BookingStatus::Booked,
            proposal_sent: true,
            created_at: "2024-01-03T00:00:00.000Z".to_string(),
        },
        Booking {
            id: "pre-4".to_string(),
            client_name: "Carolina Pinheiro".to_string(),
            client_email: "carolina.pinheiro@email.com".to_string(),
            client_phone: "915 678 901".to_string(),
            event_date: "2025-08-16".to_string(),
            event_type: "Casamento".to_string(),
            venue: "Ervedal Avis".to_string(),
            duration: 90,
            budget: "3500".to_string(),
            message: "Casamento da Carolina - evento muito especial".to_string(),
            status: BookingStatus::Booked,
            proposal_sent: true,
            created_at: "2024-01-04T00:00:00.000Z".to_string(),
        },
    ]
}

pub fn is_seed_id(id: &str) -> bool {
    pre_existing_bookings().iter().any(|b| b.id == id)
}
