//! Table operations over PostgREST.
//!
//! Tables: `services`, `projects`, `contact_messages`.

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use social_culture_core::{
    ContactMessage, Project, ProjectDraft, ProjectId, Service, ServiceDraft, ServiceId,
};

use super::cache::{CacheKey, CacheValue};
use super::{SupabaseClient, SupabaseError};

const SERVICES: &str = "services";
const PROJECTS: &str = "projects";
const CONTACT_MESSAGES: &str = "contact_messages";

/// Featured services first (rows without a flag sort with the rest), then
/// oldest first.
// Plain `featured.desc` would put NULL flags first (PostgreSQL's default for
// descending order); nullslast keeps unflagged services below featured ones.
const SERVICES_ORDER: &str = "featured.desc.nullslast,id.asc";
const PROJECTS_ORDER: &str = "id.asc";

impl SupabaseClient {
    // =========================================================================
    // Services
    // =========================================================================

    /// List all services in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the rows cannot be parsed.
    #[instrument(skip(self))]
    pub async fn list_services(&self) -> Result<Vec<Service>, SupabaseError> {
        if let Some(CacheValue::Services(services)) = self.cached(&CacheKey::Services).await {
            debug!("Cache hit for services");
            return Ok(services);
        }

        let services: Vec<Service> = self
            .select(SERVICES, &[("select", "*"), ("order", SERVICES_ORDER)])
            .await?;
        self.store(CacheKey::Services, CacheValue::Services(services.clone()))
            .await;
        Ok(services)
    }

    /// Fetch one service by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the row cannot be parsed.
    #[instrument(skip(self), fields(service_id = %id))]
    pub async fn get_service(&self, id: ServiceId) -> Result<Option<Service>, SupabaseError> {
        let key = CacheKey::Service(id);
        if let Some(CacheValue::Service(service)) = self.cached(&key).await {
            return Ok(service.map(|s| *s));
        }

        let filter = format!("eq.{id}");
        let rows: Vec<Service> = self
            .select(SERVICES, &[("select", "*"), ("id", filter.as_str())])
            .await?;
        let service = rows.into_iter().next();
        self.store(key, CacheValue::Service(service.clone().map(Box::new)))
            .await;
        Ok(service)
    }

    /// Insert a service.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the datastore rejects the row.
    #[instrument(skip(self, access_token, draft), fields(title = %draft.title))]
    pub async fn create_service(
        &self,
        access_token: &str,
        draft: &ServiceDraft,
    ) -> Result<(), SupabaseError> {
        self.insert(SERVICES, Some(access_token), draft).await?;
        self.invalidate_cache();
        Ok(())
    }

    /// Replace a service's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::NotFound` if no row was updated.
    #[instrument(skip(self, access_token, draft), fields(service_id = %id))]
    pub async fn update_service(
        &self,
        access_token: &str,
        id: ServiceId,
        draft: &ServiceDraft,
    ) -> Result<(), SupabaseError> {
        let rows = self
            .mutate(Method::PATCH, SERVICES, access_token, id.as_i64(), Some(draft))
            .await?;
        self.invalidate_cache();
        ensure_affected(&rows, SERVICES, id.as_i64())
    }

    /// Delete a service.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::NotFound` if no row was deleted.
    #[instrument(skip(self, access_token), fields(service_id = %id))]
    pub async fn delete_service(
        &self,
        access_token: &str,
        id: ServiceId,
    ) -> Result<(), SupabaseError> {
        let rows = self
            .mutate::<()>(Method::DELETE, SERVICES, access_token, id.as_i64(), None)
            .await?;
        self.invalidate_cache();
        ensure_affected(&rows, SERVICES, id.as_i64())
    }

    // =========================================================================
    // Projects
    // =========================================================================

    /// List all projects, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the rows cannot be parsed.
    #[instrument(skip(self))]
    pub async fn list_projects(&self) -> Result<Vec<Project>, SupabaseError> {
        if let Some(CacheValue::Projects(projects)) = self.cached(&CacheKey::Projects).await {
            debug!("Cache hit for projects");
            return Ok(projects);
        }

        let projects: Vec<Project> = self
            .select(PROJECTS, &[("select", "*"), ("order", PROJECTS_ORDER)])
            .await?;
        self.store(CacheKey::Projects, CacheValue::Projects(projects.clone()))
            .await;
        Ok(projects)
    }

    /// Fetch one project by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the row cannot be parsed.
    #[instrument(skip(self), fields(project_id = %id))]
    pub async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, SupabaseError> {
        let key = CacheKey::Project(id);
        if let Some(CacheValue::Project(project)) = self.cached(&key).await {
            return Ok(project.map(|p| *p));
        }

        let filter = format!("eq.{id}");
        let rows: Vec<Project> = self
            .select(PROJECTS, &[("select", "*"), ("id", filter.as_str())])
            .await?;
        let project = rows.into_iter().next();
        self.store(key, CacheValue::Project(project.clone().map(Box::new)))
            .await;
        Ok(project)
    }

    /// Insert a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the datastore rejects the row.
    #[instrument(skip(self, access_token, draft), fields(title = %draft.title))]
    pub async fn create_project(
        &self,
        access_token: &str,
        draft: &ProjectDraft,
    ) -> Result<(), SupabaseError> {
        self.insert(PROJECTS, Some(access_token), draft).await?;
        self.invalidate_cache();
        Ok(())
    }

    /// Replace a project's editable fields, including its details.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::NotFound` if no row was updated.
    #[instrument(skip(self, access_token, draft), fields(project_id = %id))]
    pub async fn update_project(
        &self,
        access_token: &str,
        id: ProjectId,
        draft: &ProjectDraft,
    ) -> Result<(), SupabaseError> {
        let rows = self
            .mutate(Method::PATCH, PROJECTS, access_token, id.as_i64(), Some(draft))
            .await?;
        self.invalidate_cache();
        ensure_affected(&rows, PROJECTS, id.as_i64())
    }

    /// Delete a project.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::NotFound` if no row was deleted.
    #[instrument(skip(self, access_token), fields(project_id = %id))]
    pub async fn delete_project(
        &self,
        access_token: &str,
        id: ProjectId,
    ) -> Result<(), SupabaseError> {
        let rows = self
            .mutate::<()>(Method::DELETE, PROJECTS, access_token, id.as_i64(), None)
            .await?;
        self.invalidate_cache();
        ensure_affected(&rows, PROJECTS, id.as_i64())
    }

    // =========================================================================
    // Contact messages
    // =========================================================================

    /// Store a contact form submission. Uses the anon key; the table only
    /// needs an insert policy for the `anon` role.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the datastore rejects the row.
    #[instrument(skip(self, message), fields(email = %message.email))]
    pub async fn insert_contact_message(
        &self,
        message: &ContactMessage,
    ) -> Result<(), SupabaseError> {
        self.insert(CONTACT_MESSAGES, None, message).await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, SupabaseError> {
        let url = self.rest_url(table, query)?;
        let response = self.request(Method::GET, url, None).send().await?;
        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))
    }

    async fn insert<B: Serialize + Sync>(
        &self,
        table: &str,
        access_token: Option<&str>,
        body: &B,
    ) -> Result<(), SupabaseError> {
        let response = self
            .request(Method::POST, self.rest_url(table, &[])?, access_token)
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// PATCH or DELETE a single row by id, returning the affected rows.
    async fn mutate<B: Serialize + Sync>(
        &self,
        method: Method,
        table: &str,
        access_token: &str,
        id: i64,
        body: Option<&B>,
    ) -> Result<Vec<serde_json::Value>, SupabaseError> {
        let filter = format!("eq.{id}");
        let url = self.rest_url(table, &[("id", filter.as_str())])?;
        let mut request = self
            .request(method, url, Some(access_token))
            .header("Prefer", "return=representation");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = Self::check(request.send().await?).await?;
        response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))
    }
}

/// Row level security turns forbidden writes into zero-row writes, so an
/// empty representation is the only signal that nothing changed.
fn ensure_affected<T>(rows: &[T], table: &str, id: i64) -> Result<(), SupabaseError> {
    if rows.is_empty() {
        return Err(SupabaseError::NotFound(format!("{table} row {id}")));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::test_support::client_for;
    use super::*;
    use social_culture_core::{ProjectInput, ServiceInput};

    fn service_rows() -> serde_json::Value {
        json!([
            { "id": 2, "title": "Ads", "description": "Paid campaigns", "image_url": null, "featured": true },
            { "id": 1, "title": "SEO", "description": "Rank higher", "image_url": "", "featured": false }
        ])
    }

    #[tokio::test]
    async fn test_list_services_orders_and_caches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/services"))
            .and(query_param("select", "*"))
            .and(query_param("order", SERVICES_ORDER))
            .respond_with(ResponseTemplate::new(200).set_body_json(service_rows()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let first = client.list_services().await.unwrap();
        let second = client.list_services().await.unwrap();

        assert_eq!(first.len(), 2);
        assert!(first[0].is_featured());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_get_project_missing_returns_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/projects"))
            .and(query_param("id", "eq.404"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let project = client_for(&server)
            .get_project(ProjectId::new(404))
            .await
            .unwrap();
        assert!(project.is_none());
    }

    #[tokio::test]
    async fn test_create_service_uses_editor_token_and_invalidates_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/services"))
            .respond_with(ResponseTemplate::new(200).set_body_json(service_rows()))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/services"))
            .and(header("authorization", "Bearer editor-token"))
            .and(header("prefer", "return=minimal"))
            .and(body_json(json!({
                "title": "Branding",
                "description": "Logo and identity",
                "image_url": null,
                "featured": false
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.list_services().await.unwrap();

        let input = ServiceInput {
            title: "Branding".to_string(),
            description: "Logo and identity".to_string(),
            ..ServiceInput::default()
        };
        let draft = ServiceDraft::try_from(&input).unwrap();
        client.create_service("editor-token", &draft).await.unwrap();

        // Cache was dropped, so this hits the server again.
        client.list_services().await.unwrap();
    }

    #[tokio::test]
    async fn test_update_project_sends_details() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/projects"))
            .and(query_param("id", "eq.7"))
            .and(header("prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 7 }])))
            .expect(1)
            .mount(&server)
            .await;

        let input = ProjectInput {
            title: "Brand X".to_string(),
            description: "d".to_string(),
            results: "+45% sales".to_string(),
            ..ProjectInput::new_project()
        };
        let draft = ProjectDraft::try_from(&input).unwrap();
        client_for(&server)
            .update_project("editor-token", ProjectId::new(7), &draft)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["details"]["results"], json!(["+45% sales"]));
    }

    #[tokio::test]
    async fn test_delete_with_no_affected_rows_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/services"))
            .and(query_param("id", "eq.9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .delete_service("editor-token", ServiceId::new(9))
            .await
            .unwrap_err();
        assert!(matches!(err, SupabaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_insert_contact_message_uses_anon_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/contact_messages"))
            .and(header("authorization", "Bearer anon-test-key"))
            .and(body_json(json!({
                "name": "Sara",
                "email": "sara@brand.com",
                "message": "Need a campaign"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let message = ContactMessage::parse("Sara", "sara@brand.com", "Need a campaign").unwrap();
        client_for(&server)
            .insert_contact_message(&message)
            .await
            .unwrap();
    }
}
