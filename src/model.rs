use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::client::Resource;
use crate::table::{FieldValue, TableRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    Planning,
    Active,
    OnHold,
    Completed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl SiteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteStatus::Planning => "planning",
            SiteStatus::Active => "active",
            SiteStatus::OnHold => "on_hold",
            SiteStatus::Completed => "completed",
            SiteStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    Pending,
    InProgress,
    Completed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl WorkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Pending => "pending",
            WorkStatus::InProgress => "in_progress",
            WorkStatus::Completed => "completed",
            WorkStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum ExpenseCategory {
    Labour,
    Materials,
    Equipment,
    Transport,
    #[default]
    #[serde(other)]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::Labour,
        ExpenseCategory::Materials,
        ExpenseCategory::Equipment,
        ExpenseCategory::Transport,
        ExpenseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Labour => "Labour",
            ExpenseCategory::Materials => "Materials",
            ExpenseCategory::Equipment => "Equipment",
            ExpenseCategory::Transport => "Transport",
            ExpenseCategory::Other => "Other",
        }
    }
}

/// A construction site as the backend reports it. Budget figures and the
/// progress sub-scores feed the composite progress metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: SiteStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub spent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub timeline_progress: f64,
    #[serde(default)]
    pub milestone_progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
}

impl Site {
    pub const RESOURCE: Resource = Resource::new("sites", "sites");
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub reorder_level: f64,
}

impl Material {
    pub const RESOURCE: Resource = Resource::new("materials", "materials");
}

/// A delivery of material to a site, optionally linked to the purchase it
/// fulfilled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialReceipt {
    pub id: String,
    pub material_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl MaterialReceipt {
    pub const RESOURCE: Resource = Resource::new("material-receipts", "receipts");
}

/// Material drawn from stock for use on a site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUsage {
    pub id: String,
    pub material_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl MaterialUsage {
    pub const RESOURCE: Resource = Resource::new("material-usage", "entries");
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(default)]
    pub category: ExpenseCategory,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Expense {
    pub const RESOURCE: Resource = Resource::new("expenses", "expenses");
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub status: WorkStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl WorkEntry {
    pub const RESOURCE: Resource = Resource::new("work-entries", "entries");
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleLog {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<String>,
    #[serde(default)]
    pub hours: f64,
    #[serde(default)]
    pub fuel_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl VehicleLog {
    pub const RESOURCE: Resource = Resource::new("vehicle-logs", "vehicleLogs");
}

fn optional_text(value: &Option<String>) -> FieldValue<'_> {
    value
        .as_deref()
        .map(FieldValue::Text)
        .unwrap_or(FieldValue::Missing)
}

fn optional_date(value: &Option<NaiveDate>) -> FieldValue<'_> {
    value.map(FieldValue::Date).unwrap_or(FieldValue::Missing)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseField {
    Site,
    Category,
    Amount,
    Date,
}

impl TableRecord for Expense {
    type Field = ExpenseField;

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, field: ExpenseField) -> FieldValue<'_> {
        match field {
            ExpenseField::Site => optional_text(&self.site_id),
            ExpenseField::Category => FieldValue::Text(self.category.as_str()),
            ExpenseField::Amount => FieldValue::Number(self.amount),
            ExpenseField::Date => optional_date(&self.date),
        }
    }

    fn search_text(&self) -> Vec<&str> {
        self.description.as_deref().into_iter().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptField {
    Material,
    Site,
    Supplier,
    Quantity,
    Amount,
    Date,
}

impl TableRecord for MaterialReceipt {
    type Field = ReceiptField;

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, field: ReceiptField) -> FieldValue<'_> {
        match field {
            ReceiptField::Material => FieldValue::Text(&self.material_id),
            ReceiptField::Site => optional_text(&self.site_id),
            ReceiptField::Supplier => optional_text(&self.supplier),
            ReceiptField::Quantity => FieldValue::Number(self.quantity),
            ReceiptField::Amount => FieldValue::Number(self.amount),
            ReceiptField::Date => optional_date(&self.date),
        }
    }

    fn search_text(&self) -> Vec<&str> {
        self.supplier
            .as_deref()
            .into_iter()
            .chain(self.notes.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteField {
    Name,
    Status,
    Budget,
    Spent,
    StartDate,
}

impl TableRecord for Site {
    type Field = SiteField;

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, field: SiteField) -> FieldValue<'_> {
        match field {
            SiteField::Name => FieldValue::Text(&self.name),
            SiteField::Status => FieldValue::Text(self.status.as_str()),
            SiteField::Budget => FieldValue::Number(self.budget),
            SiteField::Spent => FieldValue::Number(self.spent),
            SiteField::StartDate => optional_date(&self.start_date),
        }
    }

    fn search_text(&self) -> Vec<&str> {
        std::iter::once(self.name.as_str())
            .chain(self.location.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkField {
    Site,
    Status,
    Progress,
    Date,
}

impl TableRecord for WorkEntry {
    type Field = WorkField;

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, field: WorkField) -> FieldValue<'_> {
        match field {
            WorkField::Site => optional_text(&self.site_id),
            WorkField::Status => FieldValue::Text(self.status.as_str()),
            WorkField::Progress => FieldValue::Number(self.progress),
            WorkField::Date => optional_date(&self.date),
        }
    }

    fn search_text(&self) -> Vec<&str> {
        self.title.as_deref().into_iter().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialField {
    Name,
    Category,
    ReorderLevel,
}

impl TableRecord for Material {
    type Field = MaterialField;

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, field: MaterialField) -> FieldValue<'_> {
        match field {
            MaterialField::Name => FieldValue::Text(&self.name),
            MaterialField::Category => optional_text(&self.category),
            MaterialField::ReorderLevel => FieldValue::Number(self.reorder_level),
        }
    }

    fn search_text(&self) -> Vec<&str> {
        std::iter::once(self.name.as_str())
            .chain(self.category.as_deref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn receipt_accepts_camel_case_payload() {
        let payload = json!({
            "id": "r1",
            "materialId": "m1",
            "siteId": "s1",
            "supplier": "BuildCo",
            "quantity": 40,
            "amount": 1200.5,
            "date": "2026-02-14",
            "purchaseId": "p9"
        });
        let receipt: MaterialReceipt = serde_json::from_value(payload).expect("deserialize");
        assert_eq!(receipt.material_id, "m1");
        assert_eq!(receipt.purchase_id.as_deref(), Some("p9"));
        assert_eq!(
            receipt.date,
            Some("2026-02-14".parse().expect("valid date"))
        );
    }

    #[test]
    fn missing_numeric_fields_default_to_zero() {
        let payload = json!({"id": "e1", "category": "Labour"});
        let expense: Expense = serde_json::from_value(payload).expect("deserialize");
        assert_eq!(expense.amount, 0.0);
        assert_eq!(expense.category, ExpenseCategory::Labour);
        assert!(expense.date.is_none());
    }

    #[test]
    fn unknown_enum_values_bucket_as_other() {
        let payload = json!({"id": "e2", "category": "Landscaping", "amount": 10});
        let expense: Expense = serde_json::from_value(payload).expect("deserialize");
        assert_eq!(expense.category, ExpenseCategory::Other);

        let payload = json!({"id": "s1", "name": "Depot", "status": "paused"});
        let site: Site = serde_json::from_value(payload).expect("deserialize");
        assert_eq!(site.status, SiteStatus::Unknown);
    }

    #[test]
    fn vehicle_log_defaults_missing_figures_to_zero() {
        let payload = json!({"id": "v1", "siteId": "s1", "vehicle": "Excavator", "fuelCost": 80.5});
        let log: VehicleLog = serde_json::from_value(payload).expect("deserialize");
        assert_eq!(log.vehicle.as_deref(), Some("Excavator"));
        assert_eq!(log.hours, 0.0);
        assert_eq!(log.fuel_cost, 80.5);
    }

    #[test]
    fn site_status_round_trips_snake_case() {
        let site = Site {
            id: "s1".into(),
            name: "North yard".into(),
            status: SiteStatus::OnHold,
            location: None,
            budget: 0.0,
            spent: 0.0,
            start_date: None,
            end_date: None,
            timeline_progress: 0.0,
            milestone_progress: 0.0,
            quality_score: None,
        };
        let json = serde_json::to_value(&site).expect("serialize");
        assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("on_hold"));
    }
}
