//! Fluent builders for test inputs and records.

use vcm_application::dto::SubmitComplaintInput;
use vcm_domain::{
    AdminId, AdminPrincipal, AdminRole, CategoryId, Complaint, ComplaintCode, ComplaintId,
    ComplaintStatus, ContactInfo, NewComplaint, Office, Urgency, UserId,
};

use crate::fixtures::test_epoch;

/// Builder for [`SubmitComplaintInput`]
#[derive(Clone)]
pub struct SubmissionBuilder {
    input: SubmitComplaintInput,
}

impl SubmissionBuilder {
    pub fn new() -> Self {
        Self {
            input: SubmitComplaintInput {
                title: "No water in ward 4".to_string(),
                description: "The public tap near the school has been dry for five days"
                    .to_string(),
                category: "Water Supply Issues".to_string(),
                location: "Ward 4, near the primary school".to_string(),
                urgency: Urgency::Medium,
                contact: Some(ContactInfo {
                    name: "Lakshmi Devi".to_string(),
                    phone: "9876543210".to_string(),
                    email: Some("lakshmi@example.com".to_string()),
                }),
                is_anonymous: false,
                attachments: vec![],
            },
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.input.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.input.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.input.category = category.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.input.location = location.into();
        self
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.input.urgency = urgency;
        self
    }

    pub fn with_contact(mut self, contact: ContactInfo) -> Self {
        self.input.contact = Some(contact);
        self
    }

    pub fn without_contact(mut self) -> Self {
        self.input.contact = None;
        self
    }

    /// Mark anonymous; contact details stay set so tests can check they are dropped
    pub fn anonymous(mut self) -> Self {
        self.input.is_anonymous = true;
        self
    }

    pub fn with_attachment(mut self, path: impl Into<String>) -> Self {
        self.input.attachments.push(path.into());
        self
    }

    pub fn build(self) -> SubmitComplaintInput {
        self.input
    }
}

impl Default for SubmissionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`AdminPrincipal`]
#[derive(Clone)]
pub struct AdminBuilder {
    admin: AdminPrincipal,
}

impl AdminBuilder {
    pub fn new(id: i64, role: AdminRole) -> Self {
        Self {
            admin: AdminPrincipal {
                id: AdminId::new(id),
                username: format!("{}_{}", role, id),
                name: format!("Admin {}", id),
                email: format!("admin{}@vcm.test", id),
                role,
                department: None,
                designation: None,
                is_active: true,
            },
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.admin.name = name.into();
        self
    }

    pub fn with_designation(mut self, designation: impl Into<String>) -> Self {
        self.admin.designation = Some(designation.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.admin.is_active = false;
        self
    }

    pub fn build(self) -> AdminPrincipal {
        self.admin
    }
}

/// Builder for stored [`Complaint`] records, for tests below the engine
#[derive(Clone)]
pub struct ComplaintBuilder {
    draft: NewComplaint,
    status: ComplaintStatus,
    office: Office,
    assigned_to: Option<AdminId>,
}

impl ComplaintBuilder {
    pub fn new() -> Self {
        Self {
            draft: NewComplaint {
                code: ComplaintCode::compose(test_epoch().timestamp_millis(), 1),
                title: "Pothole on the main road".to_string(),
                description: "A deep pothole opposite the bus stand".to_string(),
                location: "Main road".to_string(),
                urgency: Urgency::High,
                category_id: CategoryId::new(1),
                submitter: None,
                contact: None,
                is_anonymous: false,
                attachments: vec![],
                created_at: test_epoch(),
            },
            status: ComplaintStatus::Pending,
            office: Office::UnionOffice,
            assigned_to: None,
        }
    }

    pub fn with_code(mut self, code: ComplaintCode) -> Self {
        self.draft.code = code;
        self
    }

    pub fn submitted_by(mut self, citizen: UserId) -> Self {
        self.draft.submitter = Some(citizen);
        self
    }

    pub fn with_status(mut self, status: ComplaintStatus) -> Self {
        self.status = status;
        self
    }

    pub fn in_office(mut self, office: Office) -> Self {
        self.office = office;
        self
    }

    pub fn assigned_to(mut self, admin: AdminId) -> Self {
        self.assigned_to = Some(admin);
        self
    }

    pub fn build(self, id: i64) -> Complaint {
        let at = self.draft.created_at;
        let mut complaint = self.draft.into_complaint(ComplaintId::new(id));
        complaint.apply_status(self.status, at);
        complaint.current_office = self.office;
        complaint.assigned_to = self.assigned_to;
        complaint
    }
}

impl Default for ComplaintBuilder {
    fn default() -> Self {
        Self::new()
    }
}
