// ==========================================
// 应用层工作流集成测试
// ==========================================
// 覆盖范围: 报表导出、员工台账、诊断保存、库存视图、分类选项、
// 发票工作流、主数据写接口、AppState 组装
// ==========================================

mod helpers;

use fish_farm_client::app::{
    AppState, CatalogService, DiagnosticService, InventoryService, InvoiceService, LedgerService,
    NotificationLevel, RecordingNotifier, ReportService,
};
use fish_farm_client::config::ClientConfig;
use fish_farm_client::domain::{
    FieldValue, InvoiceDraft, InvoiceLineDraft, Pond, SymptomSelection,
};
use fish_farm_client::engine::{ReportFilter, ReportType};
use fish_farm_client::{ApiError, ItemCategory, StockStatus, Unit};
use helpers::{create_test_client, date, InMemoryBackend};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn create_test_notifier() -> Arc<RecordingNotifier> {
    Arc::new(RecordingNotifier::new())
}

// ==========================================
// 报表
// ==========================================

#[tokio::test]
async fn test_report_export_writes_csv_and_notifies() {
    let (backend, client) = create_test_client();
    backend.respond(
        "/invoices/",
        json!([{
            "invoice_id": 1, "invoice_number": "INV-1", "invoice_date": "2026-01-20",
            "customer": {"id": 3, "name": "Bazar"},
            "lines": [{"item": {"id": 1, "name": "Rui", "category": "fish"},
                       "total_weight": "50", "amount": "10000"}]
        }]),
    );
    let notifier = create_test_notifier();
    let service = ReportService::new(client, notifier.clone());
    let dir = TempDir::new().unwrap();

    let filter = ReportFilter::new(date(2026, 1, 1), date(2026, 1, 31)).with_type(ReportType::Revenue);
    let exported = service.export_csv(&filter, dir.path()).await.unwrap();

    assert_eq!(
        exported.file_name,
        "P&L_Report_All_Ponds_2026-01-01_to_2026-01-31_Detail.csv"
    );
    assert!(exported.path.exists());
    let last = notifier.last().unwrap();
    assert_eq!(last.level, NotificationLevel::Success);
    assert_eq!(
        last.message,
        format!("CSV report exported successfully: {}", exported.file_name)
    );

    // 七个集合各请求一次
    for path in [
        "/bills/",
        "/invoices/",
        "/bill-payments/",
        "/customer-payments/",
        "/deposits/",
        "/payroll-runs/",
        "/ponds/",
    ] {
        assert_eq!(backend.count("GET", path), 1, "{}", path);
    }
}

#[tokio::test]
async fn test_report_load_failure_notifies() {
    let (backend, client) = create_test_client();
    backend.fail("GET", "/deposits/", 500, "down");
    let notifier = create_test_notifier();
    let service = ReportService::new(client, notifier.clone());

    let filter = ReportFilter::new(date(2026, 1, 1), date(2026, 1, 31));
    assert!(service.build(&filter).await.is_err());
    assert_eq!(notifier.last().unwrap().message, "Failed to load report data");
}

// ==========================================
// 员工台账
// ==========================================

#[tokio::test]
async fn test_employee_ledger_from_payroll_runs() {
    let (backend, client) = create_test_client();
    backend.respond(
        "/payroll-runs/",
        json!({"results": [{
            "id": 7, "run_date": "2026-02-28",
            "lines": [{"employee": 10, "full_salary": "1000", "pf_employee": "50",
                       "total_earnings": "1000", "total_deductions": "50", "net_pay": "950"}]
        }]}),
    );
    let service = LedgerService::new(client, create_test_notifier());

    let ledger = service.employee_ledger(10).await.unwrap();
    assert_eq!(ledger.closing_balance, 950.0);
    assert_eq!(ledger.entries[0].reference, "PR-7");

    let totals = service.payroll_totals().await.unwrap();
    assert_eq!(totals.net, 950.0);
    // 第二次读取命中缓存
    assert_eq!(backend.count("GET", "/payroll-runs/"), 1);
}

// ==========================================
// 鱼病诊断
// ==========================================

#[tokio::test]
async fn test_diagnostic_save_requires_pond() {
    let (backend, client) = create_test_client();
    let notifier = create_test_notifier();
    let service = DiagnosticService::new(client, notifier.clone()).unwrap();

    let selection = SymptomSelection::new();
    let diagnosis = service.analyze(&selection);
    let err = service.save(None, &diagnosis, &selection).await.unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert!(backend.calls().is_empty());
    assert_eq!(notifier.last().unwrap().message, "Please select a pond");
}

#[tokio::test]
async fn test_diagnostic_save_posts_edited_diagnosis() {
    let (backend, client) = create_test_client();
    let notifier = create_test_notifier();
    let service = DiagnosticService::new(client, notifier.clone()).unwrap();

    let mut selection = SymptomSelection::new();
    service.toggle_organ(&mut selection, "gill");
    service.toggle_condition(&mut selection, "gill", "উজ্জ্বল লাল");
    let mut diagnosis = service.analyze(&selection);
    assert_eq!(diagnosis.confidence, 95);
    diagnosis.treatment = "পর্যবেক্ষণ চালিয়ে যান".to_string();

    let saved = service.save(Some(2), &diagnosis, &selection).await.unwrap();
    assert!(saved.id > 0);
    assert_eq!(saved.confidence_percentage, 95.0);

    let post = &backend.calls_for("POST")[0];
    assert_eq!(post.path, "/medical-diagnostics/");
    let body = post.body.as_ref().unwrap();
    assert_eq!(body["pond"], json!(2));
    assert_eq!(body["recommended_treatment"], json!("পর্যবেক্ষণ চালিয়ে যান"));
    assert_eq!(body["selected_symptoms"], json!(["উজ্জ্বল লাল"]));
    assert_eq!(notifier.last().unwrap().level, NotificationLevel::Success);
}

#[tokio::test]
async fn test_diagnostic_history_newest_first() {
    let (backend, client) = create_test_client();
    backend.respond(
        "/medical-diagnostics/",
        json!([
            {"id": 1, "disease_name": "A", "created_at": "2026-01-01T08:00:00Z"},
            {"id": 2, "disease_name": "B", "created_at": "2026-03-01T08:00:00Z"}
        ]),
    );
    let service = DiagnosticService::new(client, create_test_notifier()).unwrap();

    let history = service.history().await.unwrap();
    assert_eq!(history[0].id, 2);
    assert_eq!(history[1].id, 1);
}

// ==========================================
// 库存
// ==========================================

#[tokio::test]
async fn test_pond_stock_rows() {
    let (backend, client) = create_test_client();
    backend.respond(
        "/customer-stocks/?pond=2",
        json!([
            {"customer_stock_id": 1, "item": {"id": 5, "name": "Rui", "category": "fish"},
             "current_stock": "40", "fish_count": "200"},
            {"customer_stock_id": 2, "item": {"id": 6, "name": "Pellet", "category": "feed"},
             "current_stock": "3", "min_stock_level": "5", "max_stock_level": "100"},
            {"customer_stock_id": 3, "item_category": "medicine",
             "current_stock": "0", "stock_status": "out_of_stock"}
        ]),
    );
    let service = InventoryService::new(client, create_test_notifier());

    let rows = service.pond_stock(2).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].fish.unwrap().pieces_per_kg, 5.0);
    assert_eq!(rows[1].status, StockStatus::LowStock);
    assert!(rows[1].fish.is_none());
    assert_eq!(rows[2].status, StockStatus::OutOfStock);
}

#[tokio::test]
async fn test_check_stock_for_feed_packets() {
    let (backend, client) = create_test_client();
    backend.respond(
        "/items/",
        json!([{"item_id": 6, "name": "Pellet", "category": "feed",
                "stock_entries": [{"quantity": "4", "unit": "packets", "packet_size": "25"}]}]),
    );
    let service = InventoryService::new(client, create_test_notifier());

    let ok = service.check_stock(6, 3.0, Unit::Packet, 25.0).await.unwrap();
    assert!(ok.available);
    let short = service.check_stock(6, 5.0, Unit::Packet, 25.0).await.unwrap();
    assert!(!short.available);
    let missing = service.check_stock(99, 1.0, Unit::Kg, 0.0).await.unwrap();
    assert_eq!(missing.message, "Item not found");
}

// ==========================================
// 分类选项
// ==========================================

#[tokio::test]
async fn test_expense_type_options_indented() {
    let (backend, client) = create_test_client();
    backend.respond(
        "/expense-types/",
        json!([
            {"id": 2, "name": "Feed", "parent": 1},
            {"id": 1, "name": "Operations"},
            {"id": 3, "name": "Admin"}
        ]),
    );
    let service = CatalogService::new(client);

    let options = service.expense_type_options().await.unwrap();
    let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["Admin", "Operations", "  Feed"]);
    assert_eq!(options[2].depth, 1);
}

// ==========================================
// AppState
// ==========================================

#[tokio::test]
async fn test_app_state_shares_client_cache() {
    let backend = InMemoryBackend::new();
    let state = AppState::with_backend(
        ClientConfig::default(),
        backend.clone(),
        create_test_notifier(),
    )
    .unwrap();

    state.ledger.payroll_totals().await.unwrap();
    state.ledger.employee_ledger(1).await.unwrap();
    assert_eq!(backend.count("GET", "/payroll-runs/"), 1);
    assert_eq!(state.client.cache().len().await, 1);
}

// ==========================================
// 发票
// ==========================================

fn create_test_invoice_draft(invoice_id: Option<i64>, with_feed: bool) -> InvoiceDraft {
    let mut lines = vec![InvoiceLineDraft {
        item: Some(50),
        category: Some(ItemCategory::Fish),
        rate: FieldValue::Set(300.0),
        line_number: FieldValue::Set(2.5),
        total_weight: FieldValue::Set(41.0),
        pond: Some(1),
        species: Some(7),
        ..Default::default()
    }];
    if with_feed {
        lines.push(InvoiceLineDraft {
            item: Some(8),
            category: Some(ItemCategory::Feed),
            qty: FieldValue::Set(4.0),
            rate: FieldValue::Set(12.5),
            ..Default::default()
        });
    }
    InvoiceDraft {
        invoice_id,
        customer: Some(3),
        invoice_no: "INV-20".to_string(),
        lines,
        ..Default::default()
    }
}

fn create_test_invoice_service() -> (Arc<InMemoryBackend>, Arc<RecordingNotifier>, InvoiceService) {
    let (backend, client) = create_test_client();
    backend.respond(
        "/items/",
        json!([{"item_id": 8, "name": "Pellet", "category": "feed", "total_stock_kg": "100"}]),
    );
    let notifier = create_test_notifier();
    let service = InvoiceService::new(client, notifier.clone());
    (backend, notifier, service)
}

#[tokio::test]
async fn test_invoice_create_completes_fish_lines() {
    let (backend, notifier, service) = create_test_invoice_service();

    let invoice = service
        .save(&create_test_invoice_draft(None, true))
        .await
        .unwrap();

    let posts = backend.calls_for("POST");
    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0].path, "/invoices/");
    let header = posts[0].body.as_ref().unwrap();
    assert_eq!(header["customer"], json!(3));
    assert_eq!(header["total_amount"], json!(12350.0));
    assert_eq!(header["open_balance"], json!(12350.0));

    let fish = posts[1].body.as_ref().unwrap();
    assert_eq!(posts[1].path, "/invoice-lines/");
    assert_eq!(fish["invoice"], json!(invoice.invoice_id));
    assert_eq!(fish["fish_count"], json!(103.0));
    assert_eq!(fish["qty"], json!(41.0));
    assert_eq!(fish["amount"], json!(12300.0));
    assert_eq!(fish["unit"], json!("kg"));

    let feed = posts[2].body.as_ref().unwrap();
    assert_eq!(feed["amount"], json!(50.0));
    assert!(feed["fish_count"].is_null());

    assert_eq!(
        notifier.last().unwrap().message,
        "Invoice created successfully"
    );
}

#[tokio::test]
async fn test_invoice_blank_number_gets_generated() {
    let (backend, _notifier, service) = create_test_invoice_service();
    let mut draft = create_test_invoice_draft(None, false);
    draft.invoice_no = "  ".to_string();

    service.save(&draft).await.unwrap();
    let header = backend.calls_for("POST")[0].body.clone().unwrap();
    assert!(header["invoice_no"].as_str().unwrap().starts_with("INV-"));
    assert!(header["invoice_no"].as_str().unwrap().len() > 4);
}

#[tokio::test]
async fn test_invoice_insufficient_stock_blocks_save() {
    let (backend, notifier, service) = create_test_invoice_service();
    let mut draft = create_test_invoice_draft(None, true);
    draft.lines[1].qty = FieldValue::Set(500.0);

    let err = service.save(&draft).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert!(backend.calls_for("POST").is_empty());
    let last = notifier.last().unwrap();
    assert_eq!(last.level, NotificationLevel::Error);
    assert!(last.message.starts_with("Insufficient stock"));
}

#[tokio::test]
async fn test_invoice_validation_message() {
    let (backend, notifier, service) = create_test_invoice_service();
    let mut draft = create_test_invoice_draft(None, false);
    draft.customer = None;

    assert!(service.save(&draft).await.is_err());
    assert!(backend.calls().is_empty());
    assert_eq!(notifier.last().unwrap().message, "Please select a customer");
}

#[tokio::test]
async fn test_invoice_edit_replaces_lines() {
    let (backend, notifier, service) = create_test_invoice_service();
    backend.respond(
        "/invoice-lines/?invoice=7",
        json!([{"invoice_line_id": 31}, {"invoice_line_id": 32}]),
    );

    let invoice = service
        .save(&create_test_invoice_draft(Some(7), false))
        .await
        .unwrap();
    assert_eq!(invoice.invoice_id, 7);

    let calls: Vec<(String, String)> = backend
        .calls()
        .into_iter()
        .map(|c| (c.method, c.path))
        .collect();
    let expected: Vec<(String, String)> = [
        ("PUT", "/invoices/7/"),
        ("GET", "/invoice-lines/?invoice=7"),
        ("DELETE", "/invoice-lines/31/"),
        ("DELETE", "/invoice-lines/32/"),
        ("POST", "/invoice-lines/"),
    ]
    .iter()
    .map(|(m, p)| (m.to_string(), p.to_string()))
    .collect();
    assert_eq!(calls, expected);
    assert_eq!(
        notifier.last().unwrap().message,
        "Invoice updated successfully"
    );
}

#[tokio::test]
async fn test_invoice_duplicate_number_message() {
    let (backend, notifier, service) = create_test_invoice_service();
    backend.fail("POST", "/invoices/", 400, r#"{"error": "invoice already exists"}"#);

    let err = service
        .save(&create_test_invoice_draft(None, false))
        .await
        .unwrap_err();
    assert!(err.is_duplicate());
    assert_eq!(
        notifier.last().unwrap().message,
        "Invoice number 'INV-20' already exists. Please use a different number."
    );
}

#[tokio::test]
async fn test_invoice_load_draft_uses_embedded_lines() {
    let (backend, _notifier, service) = create_test_invoice_service();
    backend.respond(
        "/invoices/7/",
        json!({
            "invoice_id": 7, "invoice_no": "INV-7", "customer": 3,
            "lines": [
                {"invoice_line_id": 31, "item": 50, "item_category": "fish",
                 "total_weight": "41", "rate": "300", "pond": 1},
                {"invoice_line_id": 32, "item": 8, "qty": "4", "unit": "kgs", "rate": "12.5"}
            ]
        }),
    );

    let draft = service.load_draft(7).await.unwrap();
    assert_eq!(draft.invoice_id, Some(7));
    assert_eq!(draft.customer, Some(3));
    assert_eq!(draft.lines[0].category, Some(ItemCategory::Fish));
    assert_eq!(draft.lines[0].pond, Some(1));
    assert_eq!(draft.lines[1].category, Some(ItemCategory::Feed));
    assert_eq!(draft.lines[1].unit, Unit::Kg);
    assert_eq!(backend.count("GET", "/invoice-lines/?invoice=7"), 0);
}

#[tokio::test]
async fn test_invoice_delete_notifies() {
    let (backend, notifier, service) = create_test_invoice_service();
    service.delete(7).await.unwrap();
    assert_eq!(backend.count("DELETE", "/invoices/7/"), 1);
    assert_eq!(notifier.last().unwrap().message, "Invoice deleted successfully");

    backend.fail("DELETE", "/invoices/8/", 404, "");
    assert!(service.delete(8).await.is_err());
    assert_eq!(notifier.last().unwrap().message, "Failed to delete invoice");
}

// ==========================================
// 主数据写接口
// ==========================================

#[tokio::test]
async fn test_pond_writes_invalidate_list_cache() {
    let (backend, client) = create_test_client();

    client.ponds().await.unwrap();
    client.ponds().await.unwrap();
    assert_eq!(backend.count("GET", "/ponds/"), 1);

    let pond = Pond {
        name: "East".to_string(),
        area_decimal: 12.0,
        ..Default::default()
    };
    let created = client.create_pond(&pond).await.unwrap();
    assert_eq!(created.name, "East");
    assert!(created.key().is_some());
    client.ponds().await.unwrap();
    assert_eq!(backend.count("GET", "/ponds/"), 2);

    client.update_pond(3, &pond).await.unwrap();
    client.delete_pond(3).await.unwrap();
    assert_eq!(backend.count("PUT", "/ponds/3/"), 1);
    assert_eq!(backend.count("DELETE", "/ponds/3/"), 1);
    client.ponds().await.unwrap();
    assert_eq!(backend.count("GET", "/ponds/"), 3);
}

#[tokio::test]
async fn test_delete_bill_invalidates_line_cache() {
    let (backend, client) = create_test_client();

    client.bill_lines(5).await.unwrap();
    client.bill_lines(5).await.unwrap();
    assert_eq!(backend.count("GET", "/bill-lines/?bill=5"), 1);

    client.delete_bill(5).await.unwrap();
    client.bill_lines(5).await.unwrap();
    assert_eq!(backend.count("GET", "/bill-lines/?bill=5"), 2);
}
