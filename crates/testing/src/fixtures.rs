//! Test fixtures with realistic randomized data.

use chrono::{DateTime, TimeZone, Utc};
use fake::{
    faker::{
        address::en::{CityName, StreetName},
        internet::en::{FreeEmail, Username},
        lorem::en::{Paragraph, Sentence},
        name::en::Name,
        phone_number::en::PhoneNumber,
    },
    Fake,
};
use vcm_application::dto::SubmitComplaintInput;
use vcm_domain::{
    AdminId, AdminPrincipal, AdminRole, ContactInfo, Urgency, UserId, DEFAULT_CATEGORIES,
};

/// The instant every [`crate::TestWorld`] clock starts at
pub fn test_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// An active admin with a fake name and the given role
pub fn create_test_admin(id: i64, role: AdminRole) -> AdminPrincipal {
    AdminPrincipal {
        id: AdminId::new(id),
        username: Username().fake(),
        name: Name().fake(),
        email: FreeEmail().fake(),
        role,
        department: Some(role.to_string()),
        designation: Some(Sentence(1..3).fake()),
        is_active: true,
    }
}

/// Two active admins per office plus one super admin, ids 1 through 7
pub fn create_test_directory() -> Vec<AdminPrincipal> {
    let mut admins = Vec::new();
    let mut next_id = 1;
    for role in [
        AdminRole::UnionOffice,
        AdminRole::CollectorOffice,
        AdminRole::CmOffice,
    ] {
        for _ in 0..2 {
            admins.push(create_test_admin(next_id, role));
            next_id += 1;
        }
    }
    admins.push(create_test_admin(next_id, AdminRole::SuperAdmin));
    admins
}

pub fn create_test_citizen() -> UserId {
    UserId::new((1_000..100_000).fake())
}

pub fn create_test_contact() -> ContactInfo {
    ContactInfo {
        name: Name().fake(),
        phone: PhoneNumber().fake(),
        email: Some(FreeEmail().fake()),
    }
}

/// A named, non-anonymous submission in a random default category
pub fn create_test_submission() -> SubmitComplaintInput {
    let category = DEFAULT_CATEGORIES[(0..DEFAULT_CATEGORIES.len()).fake::<usize>()].0;
    SubmitComplaintInput {
        title: Sentence(3..6).fake(),
        description: Paragraph(1..3).fake(),
        category: category.to_string(),
        location: format!(
            "{}, {}",
            StreetName().fake::<String>(),
            CityName().fake::<String>()
        ),
        urgency: Urgency::all()[(0..Urgency::all().len()).fake::<usize>()],
        contact: Some(create_test_contact()),
        is_anonymous: false,
        attachments: vec![],
    }
}
