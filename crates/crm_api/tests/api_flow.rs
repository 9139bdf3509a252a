use crm_api::{init_logging, ping, ApiResponse, CrmApi};
use serde_json::Value;
use tempfile::TempDir;

fn fresh_api() -> (TempDir, CrmApi) {
    let dir = TempDir::new().unwrap();
    let api = CrmApi::new(dir.path().join("crm.sqlite3"));
    (dir, api)
}

fn ok_body(response: ApiResponse) -> Value {
    assert!(
        response.is_success(),
        "expected success, got {} {}",
        response.status,
        response.body
    );
    response.body
}

fn id_of(body: &Value) -> String {
    body["id"].as_str().unwrap().to_string()
}

#[test]
fn ping_passes_through() {
    assert_eq!(ping(), "pong");
}

#[test]
fn init_logging_reports_bad_input_as_message() {
    assert!(!init_logging("info", "").is_empty());
    assert!(!init_logging("verbose", "/tmp/crm-logs").is_empty());
}

#[test]
fn contact_create_defaults_and_duplicate_email_conflict() {
    let (_dir, api) = fresh_api();
    let created = ok_body(api.create(
        "contacts",
        r#"{"name":"Ada Lovelace","email":"ada@example.com","phone":""}"#,
    ));
    assert_eq!(created["status"], "active");
    assert!(created["phone"].is_null());

    let duplicate = api.create("contacts", r#"{"name":"Other","email":"ada@example.com"}"#);
    assert_eq!(duplicate.status, 409);
    assert_eq!(
        duplicate.error_message(),
        Some("a contact with this email already exists")
    );

    ok_body(api.create("contacts", r#"{"name":"Grace","email":"grace@example.com"}"#));
    let listed = ok_body(api.list("contacts"));
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[test]
fn invalid_payloads_map_to_bad_request() {
    let (_dir, api) = fresh_api();
    let missing_email = api.create("contacts", r#"{"name":"Ada"}"#);
    assert_eq!(missing_email.status, 400);
    assert_eq!(missing_email.error_message(), Some("email is required"));

    let malformed = api.create("deals", "{not json");
    assert_eq!(malformed.status, 400);

    let bad_id = api.delete("deals", "not-a-uuid");
    assert_eq!(bad_id.status, 400);

    let unknown = api.list("invoices");
    assert_eq!(unknown.status, 404);
}

#[test]
fn task_with_unknown_status_is_rejected_without_a_write() {
    let (_dir, api) = fresh_api();
    let rejected = api.create(
        "tasks",
        r#"{"title":"Call back","dueDate":1700000000000,"status":"CANCELLED","priority":"HIGH"}"#,
    );
    assert_eq!(rejected.status, 400);
    assert!(rejected.error_message().unwrap().contains("status"));

    let listed = ok_body(api.list("tasks"));
    assert!(listed.as_array().unwrap().is_empty());
}

#[test]
fn deal_flow_moves_stage_and_feeds_board() {
    let (_dir, api) = fresh_api();
    let deal = ok_body(api.create("deals", r#"{"title":"Website Redesign","value":100}"#));
    assert_eq!(deal["stage"], "lead");
    let id = id_of(&deal);
    ok_body(api.create(
        "deals",
        r#"{"title":"Support Renewal","value":50,"stage":"closed"}"#,
    ));

    let moved = ok_body(api.move_deal(&id, "proposal"));
    assert_eq!(moved["stage"], "proposal");
    assert_eq!(moved["value"], 100.0);
    assert_eq!(moved["title"], "Website Redesign");

    let bad_stage = api.move_deal(&id, "won");
    assert_eq!(bad_stage.status, 400);
    let missing = api.move_deal(&uuid::Uuid::new_v4().to_string(), "closed");
    assert_eq!(missing.status, 404);

    let board = ok_body(api.pipeline_board(""));
    let columns = board["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 4);
    assert_eq!(columns[0]["stage"], "lead");
    assert_eq!(columns[0]["dealCount"], 0);
    assert_eq!(columns[1]["dealCount"], 1);
    assert_eq!(board["totalValue"], 150.0);

    let filtered = ok_body(api.pipeline_board("renewal"));
    assert_eq!(filtered["totalValue"], 50.0);
}

#[test]
fn deal_with_unknown_contact_is_not_found() {
    let (_dir, api) = fresh_api();
    let payload = format!(
        r#"{{"title":"Orphan","contactId":"{}"}}"#,
        uuid::Uuid::new_v4()
    );
    let response = api.create("deals", &payload);
    assert_eq!(response.status, 404);
    assert!(ok_body(api.list("deals")).as_array().unwrap().is_empty());
}

#[test]
fn update_keeps_absent_fields_and_clears_nulls() {
    let (_dir, api) = fresh_api();
    let deal = ok_body(api.create(
        "deals",
        r#"{"title":"Mobile App","value":300,"description":"phase one"}"#,
    ));
    let id = id_of(&deal);

    let updated = ok_body(api.update("deals", &id, r#"{"description":null}"#));
    assert!(updated["description"].is_null());
    assert_eq!(updated["title"], "Mobile App");
    assert_eq!(updated["value"], 300.0);

    let negative = api.update("deals", &id, r#"{"value":-1}"#);
    assert_eq!(negative.status, 400);
}

#[test]
fn toggle_cycles_task_status() {
    let (_dir, api) = fresh_api();
    let task = ok_body(api.create(
        "tasks",
        r#"{"title":"Send proposal","dueDate":1700000000000,"status":"TODO","priority":"MEDIUM"}"#,
    ));
    let id = id_of(&task);
    let labels: Vec<Value> = (0..3)
        .map(|_| ok_body(api.toggle_task_status(&id))["status"].clone())
        .collect();
    assert_eq!(labels, vec!["IN_PROGRESS", "DONE", "TODO"]);
}

#[test]
fn contact_detail_embeds_related_records() {
    let (_dir, api) = fresh_api();
    let contact = ok_body(api.create("contacts", r#"{"name":"Ada","email":"ada@example.com"}"#));
    let contact_id = id_of(&contact);
    let deal = ok_body(api.create(
        "deals",
        &format!(r#"{{"title":"Analytics","contactId":"{contact_id}"}}"#),
    ));
    let deal_id = id_of(&deal);
    ok_body(api.create(
        "activities",
        &format!(r#"{{"type":"call","contactId":"{contact_id}","dealId":"{deal_id}"}}"#),
    ));

    let detail = ok_body(api.contact_detail(&contact_id));
    assert_eq!(detail["name"], "Ada");
    assert_eq!(detail["deals"].as_array().unwrap().len(), 1);
    assert_eq!(detail["activities"].as_array().unwrap().len(), 1);
    assert!(detail["tasks"].as_array().unwrap().is_empty());

    let logged = ok_body(api.deal_activities(&deal_id));
    assert_eq!(logged.as_array().unwrap().len(), 1);
    assert_eq!(logged[0]["description"], "");
}

#[test]
fn dashboard_and_stats_reflect_store() {
    let (_dir, api) = fresh_api();
    ok_body(api.create("contacts", r#"{"name":"Ada","email":"ada@example.com"}"#));
    ok_body(api.create("deals", r#"{"title":"Open","value":100}"#));
    ok_body(api.create("deals", r#"{"title":"Won","value":50,"stage":"closed"}"#));
    ok_body(api.create(
        "tasks",
        r#"{"title":"Follow up","dueDate":1700000000000,"status":"TODO","priority":"LOW"}"#,
    ));

    let stats = ok_body(api.dashboard_stats());
    assert_eq!(stats["contacts"], 1);
    assert_eq!(stats["deals"], 2);
    assert_eq!(stats["tasks"], 1);
    assert_eq!(stats["activities"], 0);

    let summary = ok_body(api.dashboard());
    assert_eq!(summary["activeDeals"], 1);
    assert_eq!(summary["totalPipelineValue"], 150.0);
    assert_eq!(summary["pendingTasks"], 1);
    assert_eq!(summary["upcomingTasks"].as_array().unwrap().len(), 1);
}

#[test]
fn delete_reports_missing_rows() {
    let (_dir, api) = fresh_api();
    let contact = ok_body(api.create("contacts", r#"{"name":"Ada","email":"ada@example.com"}"#));
    let id = id_of(&contact);
    assert_eq!(ok_body(api.delete("contacts", &id))["success"], true);
    assert_eq!(api.delete("contacts", &id).status, 404);
}

#[test]
fn migrate_tasks_on_clean_store_migrates_nothing() {
    let (_dir, api) = fresh_api();
    let body = ok_body(api.migrate_tasks());
    assert_eq!(body["success"], true);
    assert_eq!(body["report"]["migrated"], 0);
    assert_eq!(body["message"], "Successfully migrated 0 tasks");
}
