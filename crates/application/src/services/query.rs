//! Complaint read paths
//!
//! Public status lookup and search, citizen self-service listing, and the
//! office-scoped admin views.

use super::{AccessGuard, Repositories, ServiceConfig};
use crate::dto::{
    preview, resolution_rate, AdminSummary, AssigneeView, CategoryCount, ComplaintDetail,
    ComplaintSearchItem, ComplaintStatistics, ComplaintView, DashboardStats, HistoryView,
};
use crate::ports::{
    AdminDirectoryPort, CategoryRepositoryPort, ComplaintFilter, ComplaintRepositoryPort,
    ComplaintTally, StatusHistoryRepositoryPort, StoreHealthPort,
};
use crate::{ApplicationError, ApplicationResult};
use chrono::Duration;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument};
use vcm_common::{Clock, PaginatedResult, PaginationParams};
use vcm_domain::{
    AdminId, AdminPrincipal, Category, CategoryId, Complaint, ComplaintCode, ComplaintId,
    ComplaintStatus, Urgency, UserId,
};

/// Dashboards count complaints created within this many days
const RECENT_WINDOW_DAYS: i64 = 7;

/// Filters an admin may apply to the complaint list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminComplaintQuery {
    pub status: Option<ComplaintStatus>,
    pub urgency: Option<Urgency>,
    /// Category name
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Filters accepted by the public search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublicSearchQuery {
    pub q: Option<String>,
    /// Category name
    pub category: Option<String>,
    pub status: Option<ComplaintStatus>,
}

/// Read-only views over complaints
pub struct ComplaintQueryService {
    complaints: Arc<dyn ComplaintRepositoryPort>,
    history: Arc<dyn StatusHistoryRepositoryPort>,
    admins: Arc<dyn AdminDirectoryPort>,
    categories: Arc<dyn CategoryRepositoryPort>,
    health: Arc<dyn StoreHealthPort>,
    guard: Arc<AccessGuard>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

impl ComplaintQueryService {
    pub fn new(
        repositories: &Repositories,
        guard: Arc<AccessGuard>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            complaints: repositories.complaints.clone(),
            history: repositories.history.clone(),
            admins: repositories.admins.clone(),
            categories: repositories.categories.clone(),
            health: repositories.health.clone(),
            guard,
            clock,
            config,
        }
    }

    /// Public status lookup by complaint code, with contact details withheld
    #[instrument(skip(self))]
    pub async fn get_status(&self, code: &str) -> ApplicationResult<ComplaintDetail> {
        let not_found = || ApplicationError::NotFound("Complaint not found".to_string());
        let code = ComplaintCode::parse(code).map_err(|_| not_found())?;
        let complaint = self
            .complaints
            .find_by_code(&code)
            .await?
            .ok_or_else(not_found)?;

        let mut detail = self.detail(complaint).await?;
        detail.complaint = detail.complaint.redacted();
        Ok(detail)
    }

    /// Full record for an admin with authority over it
    #[instrument(skip(self, admin), fields(admin_id = %admin.id))]
    pub async fn get_for_admin(
        &self,
        admin: &AdminPrincipal,
        id: ComplaintId,
    ) -> ApplicationResult<ComplaintDetail> {
        let complaint = self
            .complaints
            .find_by_id(id)
            .await?
            .ok_or_else(ApplicationError::complaint_not_found)?;
        self.guard.authorize(admin, &complaint)?;
        self.detail(complaint).await
    }

    /// Complaints visible to the admin, newest first
    #[instrument(skip(self, admin, query), fields(admin_id = %admin.id))]
    pub async fn list_for_admin(
        &self,
        admin: &AdminPrincipal,
        query: AdminComplaintQuery,
        page: Option<PaginationParams>,
    ) -> ApplicationResult<PaginatedResult<ComplaintView>> {
        let page = self.config.page(page);
        let Some(category_id) = self.category_filter(query.category.as_deref()).await? else {
            return Ok(PaginatedResult::from_params(Vec::new(), &page, 0));
        };

        let filter = ComplaintFilter {
            office: admin.visible_office(),
            status: query.status,
            urgency: query.urgency,
            category_id,
            submitter: None,
            search: query.search,
        };
        self.list_views(&filter, &page).await
    }

    /// The citizen's own complaints, newest first
    #[instrument(skip(self))]
    pub async fn list_for_citizen(
        &self,
        citizen: UserId,
        status: Option<ComplaintStatus>,
        page: Option<PaginationParams>,
    ) -> ApplicationResult<PaginatedResult<ComplaintView>> {
        let page = self.config.page(page);
        let filter = ComplaintFilter {
            submitter: Some(citizen),
            status,
            ..Default::default()
        };
        let result = self.list_views(&filter, &page).await?;
        Ok(result.map(|view| ComplaintView {
            contact: None,
            ..view
        }))
    }

    /// Public search with a limited view of each complaint
    #[instrument(skip(self, query))]
    pub async fn search(
        &self,
        query: PublicSearchQuery,
        page: Option<PaginationParams>,
    ) -> ApplicationResult<PaginatedResult<ComplaintSearchItem>> {
        let page = self.config.page(page);
        let Some(category_id) = self.category_filter(query.category.as_deref()).await? else {
            return Ok(PaginatedResult::from_params(Vec::new(), &page, 0));
        };

        let filter = ComplaintFilter {
            status: query.status,
            category_id,
            search: query.q,
            ..Default::default()
        };
        let (complaints, total) = self.complaints.list(&filter, &page).await?;
        let names = self.category_names().await?;

        let items = complaints
            .into_iter()
            .map(|c| ComplaintSearchItem {
                description_preview: preview(&c.description),
                category_name: names.get(&c.category_id).cloned(),
                complaint_code: c.code,
                title: c.title,
                location: c.location,
                urgency: c.urgency,
                status: c.status,
                current_office: c.current_office,
                created_at: c.created_at,
            })
            .collect();

        Ok(PaginatedResult::from_params(items, &page, total))
    }

    /// System-wide public statistics
    #[instrument(skip(self))]
    pub async fn statistics(&self) -> ApplicationResult<ComplaintStatistics> {
        let since = self.clock.now() - Duration::days(RECENT_WINDOW_DAYS);
        let tally = self.complaints.tally(None, since).await?;
        let resolved = tally.count_for_status(ComplaintStatus::Resolved);

        Ok(ComplaintStatistics {
            total_complaints: tally.total,
            resolved_complaints: resolved,
            resolution_rate: resolution_rate(resolved, tally.total),
            complaints_by_status: status_map(&tally),
            complaints_by_category: self.category_counts(&tally).await?,
        })
    }

    /// Office-scoped dashboard counts
    #[instrument(skip(self, admin), fields(admin_id = %admin.id))]
    pub async fn dashboard(&self, admin: &AdminPrincipal) -> ApplicationResult<DashboardStats> {
        let since = self.clock.now() - Duration::days(RECENT_WINDOW_DAYS);
        let tally = self
            .complaints
            .tally(admin.visible_office(), since)
            .await?;

        let complaints_by_urgency = tally
            .by_urgency
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(urgency, n)| (urgency.as_str().to_string(), *n))
            .collect();

        Ok(DashboardStats {
            total_complaints: tally.total,
            recent_complaints: tally.created_since,
            complaints_by_status: status_map(&tally),
            complaints_by_urgency,
            complaints_by_category: self.category_counts(&tally).await?,
        })
    }

    /// Active admins the caller may pick from, ordered by name
    #[instrument(skip(self, admin), fields(admin_id = %admin.id))]
    pub async fn list_assignable_admins(
        &self,
        admin: &AdminPrincipal,
    ) -> ApplicationResult<Vec<AdminSummary>> {
        let role = (!admin.role.is_super_admin()).then_some(admin.role);
        let admins = self.admins.list_active(role).await?;
        Ok(admins.into_iter().map(AdminSummary::from).collect())
    }

    /// Active categories ordered by name
    pub async fn categories(&self) -> ApplicationResult<Vec<Category>> {
        self.categories.list_active().await
    }

    /// Liveness of the backing store
    pub async fn ready(&self) -> ApplicationResult<()> {
        self.health.check().await
    }

    async fn detail(&self, complaint: Complaint) -> ApplicationResult<ComplaintDetail> {
        let entries = self.history.list_for_complaint(complaint.id).await?;

        let mut actors = HashMap::new();
        for admin_id in entries.iter().filter_map(|e| e.changed_by) {
            if !actors.contains_key(&admin_id) {
                if let Some(admin) = self.admins.find(admin_id).await? {
                    actors.insert(admin_id, admin);
                }
            }
        }

        let status_history = entries
            .into_iter()
            .map(|entry| {
                let actor = entry.changed_by.and_then(|id| actors.get(&id));
                HistoryView::new(entry, actor)
            })
            .collect();

        let names = self.category_names().await?;
        let complaint = self.view(complaint, &names).await?;
        Ok(ComplaintDetail {
            complaint,
            status_history,
        })
    }

    async fn list_views(
        &self,
        filter: &ComplaintFilter,
        page: &PaginationParams,
    ) -> ApplicationResult<PaginatedResult<ComplaintView>> {
        let (complaints, total) = self.complaints.list(filter, page).await?;
        debug!(total, returned = complaints.len(), "Complaints listed");

        let names = self.category_names().await?;
        let mut views = Vec::with_capacity(complaints.len());
        for complaint in complaints {
            views.push(self.view(complaint, &names).await?);
        }
        Ok(PaginatedResult::from_params(views, page, total))
    }

    async fn view(
        &self,
        complaint: Complaint,
        names: &HashMap<CategoryId, String>,
    ) -> ApplicationResult<ComplaintView> {
        let assigned_to = match complaint.assigned_to {
            Some(id) => self.assignee(id).await?,
            None => None,
        };

        Ok(ComplaintView {
            id: complaint.id,
            category_name: names.get(&complaint.category_id).cloned(),
            complaint_code: complaint.code,
            title: complaint.title,
            description: complaint.description,
            location: complaint.location,
            urgency: complaint.urgency,
            status: complaint.status,
            current_office: complaint.current_office,
            assigned_to,
            is_anonymous: complaint.is_anonymous,
            attachments: complaint.attachments,
            contact: complaint.contact,
            submitter: complaint.submitter,
            created_at: complaint.created_at,
            updated_at: complaint.updated_at,
            resolved_at: complaint.resolved_at,
        })
    }

    async fn assignee(&self, id: AdminId) -> ApplicationResult<Option<AssigneeView>> {
        Ok(self.admins.find(id).await?.map(|admin| AssigneeView {
            id: admin.id,
            name: admin.name,
            designation: admin.designation,
        }))
    }

    /// `Ok(None)` when a category name was given but matches nothing
    async fn category_filter(
        &self,
        name: Option<&str>,
    ) -> ApplicationResult<Option<Option<CategoryId>>> {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            None => Ok(Some(None)),
            Some(name) => Ok(self
                .categories
                .resolve(name)
                .await?
                .map(|category| Some(category.id))),
        }
    }

    async fn category_names(&self) -> ApplicationResult<HashMap<CategoryId, String>> {
        Ok(self
            .categories
            .list_all()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect())
    }

    /// Active categories plus retired ones still holding complaints, largest first
    async fn category_counts(
        &self,
        tally: &ComplaintTally,
    ) -> ApplicationResult<Vec<CategoryCount>> {
        let counts: HashMap<CategoryId, u64> = tally.by_category.iter().copied().collect();
        let mut rows: Vec<CategoryCount> = self
            .categories
            .list_all()
            .await?
            .into_iter()
            .filter(|c| c.is_active || counts.contains_key(&c.id))
            .map(|c| CategoryCount {
                count: counts.get(&c.id).copied().unwrap_or(0),
                category: c.name,
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
        Ok(rows)
    }
}

fn status_map(tally: &ComplaintTally) -> BTreeMap<String, u64> {
    tally
        .by_status
        .iter()
        .filter(|(_, n)| *n > 0)
        .map(|(status, n)| (status.as_str().to_string(), *n))
        .collect()
}
