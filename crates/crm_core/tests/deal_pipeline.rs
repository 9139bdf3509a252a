use crm_core::db::open_db_in_memory;
use crm_core::pipeline::{deals_by_stage, total_value_by_stage};
use crm_core::{
    CrmSnapshot, DealPatch, DealService, DealStage, ErrorKind, NewDeal, SqliteDealRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn service(conn: &Connection) -> DealService<SqliteDealRepository<'_>> {
    DealService::new(SqliteDealRepository::try_new(conn).unwrap())
}

fn new_deal(title: &str, value: f64, stage: Option<&str>) -> NewDeal {
    NewDeal {
        title: Some(title.to_string()),
        value: Some(value),
        stage: stage.map(str::to_string),
        ..NewDeal::default()
    }
}

#[test]
fn add_defaults_stage_to_lead() {
    let conn = open_db_in_memory().unwrap();
    let deals = service(&conn);
    let deal = deals
        .add(&NewDeal {
            title: Some("Website Redesign".to_string()),
            ..NewDeal::default()
        })
        .unwrap();
    assert_eq!(deal.stage, DealStage::Lead);
    assert_eq!(deal.value, 0.0);
}

#[test]
fn add_rejects_unresolved_contact() {
    let conn = open_db_in_memory().unwrap();
    let deals = service(&conn);
    let mut input = new_deal("Orphan", 10.0, None);
    input.contact_id = Some(Uuid::new_v4());

    assert_eq!(deals.add(&input).unwrap_err().kind(), ErrorKind::NotFound);
    assert!(deals.list().unwrap().is_empty());
}

#[test]
fn move_changes_only_the_stage_for_every_target() {
    let conn = open_db_in_memory().unwrap();
    let deals = service(&conn);
    let original = deals
        .add(&NewDeal {
            title: Some("Mobile App".to_string()),
            value: Some(300.0),
            description: Some("phase one".to_string()),
            ..NewDeal::default()
        })
        .unwrap();

    for stage in DealStage::ALL {
        let moved = deals.move_deal(original.id, stage.as_str()).unwrap();
        assert_eq!(moved.stage, stage);

        let reread = deals.get(original.id).unwrap();
        assert_eq!(reread.stage, stage);
        assert_eq!(reread.title, original.title);
        assert_eq!(reread.value, original.value);
        assert_eq!(reread.description, original.description);
        assert_eq!(reread.contact_id, original.contact_id);
        assert_eq!(reread.created_at, original.created_at);
    }
}

#[test]
fn moving_to_the_current_stage_is_allowed() {
    let conn = open_db_in_memory().unwrap();
    let deals = service(&conn);
    let deal = deals.add(&new_deal("Renewal", 50.0, Some("closed"))).unwrap();
    let moved = deals.move_deal_to(deal.id, DealStage::Closed).unwrap();
    assert_eq!(moved.stage, DealStage::Closed);
}

#[test]
fn move_of_missing_deal_is_not_found_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let deals = service(&conn);
    let existing = deals.add(&new_deal("Kept", 10.0, None)).unwrap();

    let err = deals.move_deal(Uuid::new_v4(), "proposal").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    // Label validity does not matter when the deal is missing.
    let err = deals.move_deal(Uuid::new_v4(), "won").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert_eq!(deals.list().unwrap(), vec![existing]);
}

#[test]
fn move_with_unknown_stage_is_invalid_argument() {
    let conn = open_db_in_memory().unwrap();
    let deals = service(&conn);
    let deal = deals.add(&new_deal("Website", 100.0, None)).unwrap();

    for label in ["won", "Lead", " proposal", ""] {
        let err = deals.move_deal(deal.id, label).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "label `{label}`");
    }
    assert_eq!(deals.get(deal.id).unwrap().stage, DealStage::Lead);
}

#[test]
fn lead_to_proposal_scenario_regroups_the_board() {
    let conn = open_db_in_memory().unwrap();
    let deals = service(&conn);
    let first = deals.add(&new_deal("First", 100.0, Some("lead"))).unwrap();
    deals.add(&new_deal("Second", 50.0, Some("closed"))).unwrap();

    let moved = deals.move_deal(first.id, "proposal").unwrap();
    assert_eq!(moved.stage, DealStage::Proposal);
    assert_eq!(moved.value, 100.0);

    let listed = deals.list().unwrap();
    let groups = deals_by_stage(&listed);
    assert!(groups.lead.is_empty());
    assert_eq!(groups.proposal.len(), 1);
    assert_eq!(groups.proposal[0].id, first.id);

    let total: f64 = DealStage::ALL
        .iter()
        .map(|stage| total_value_by_stage(&listed, *stage))
        .sum();
    assert_eq!(total, 150.0);
}

#[test]
fn update_applies_partial_changes() {
    let conn = open_db_in_memory().unwrap();
    let deals = service(&conn);
    let deal = deals.add(&new_deal("Website", 100.0, None)).unwrap();

    let patch = DealPatch {
        value: Some(250.0),
        stage: Some("negotiation".to_string()),
        ..DealPatch::default()
    };
    let updated = deals.update(deal.id, &patch).unwrap();
    assert_eq!(updated.value, 250.0);
    assert_eq!(updated.stage, DealStage::Negotiation);
    assert_eq!(updated.title, "Website");

    let empty = deals.update(deal.id, &DealPatch::default()).unwrap();
    assert_eq!(empty.value, 250.0);

    let negative = DealPatch {
        value: Some(-1.0),
        ..DealPatch::default()
    };
    assert_eq!(
        deals.update(deal.id, &negative).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        deals
            .update(Uuid::new_v4(), &DealPatch::default())
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn delete_then_delete_again_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let deals = service(&conn);
    let deal = deals.add(&new_deal("Gone", 1.0, None)).unwrap();
    deals.delete(deal.id).unwrap();
    assert_eq!(deals.delete(deal.id).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn snapshot_board_filters_then_partitions() {
    let conn = open_db_in_memory().unwrap();
    let deals = service(&conn);
    deals.add(&new_deal("Website Redesign", 100.0, None)).unwrap();
    deals.add(&new_deal("Website Hosting", 20.0, Some("proposal"))).unwrap();
    deals.add(&new_deal("Support", 5.0, Some("closed"))).unwrap();

    let board = CrmSnapshot::load(&conn).unwrap().board("website");
    assert_eq!(board.total_value, 120.0);
    assert_eq!(board.column(DealStage::Lead).unwrap().deal_count, 1);
    assert_eq!(board.column(DealStage::Proposal).unwrap().deal_count, 1);
    assert_eq!(board.column(DealStage::Closed).unwrap().deal_count, 0);
}
