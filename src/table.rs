use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::NaiveDate;

/// One filterable/sortable field value, borrowed from a record. Records that
/// lack a field report [`FieldValue::Missing`]; a missing value never matches
/// a non-empty criterion and sorts as empty/zero/earliest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    Date(NaiveDate),
    Missing,
}

impl FieldValue<'_> {
    /// Total order used for sorting. Strings compare case-insensitively,
    /// mixed-type pairs (which a well-formed screen never produces) are left
    /// in their input order.
    pub fn compare(&self, other: &FieldValue<'_>) -> Ordering {
        use FieldValue::*;
        match (self, other) {
            (Text(a), Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Number(a), Number(b)) => a.total_cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Missing, Missing) => Ordering::Equal,
            (Missing, Text(b)) => "".cmp(&b.to_lowercase()),
            (Text(a), Missing) => a.to_lowercase().as_str().cmp(""),
            (Missing, Number(b)) => 0f64.total_cmp(b),
            (Number(a), Missing) => a.total_cmp(&0f64),
            (Missing, Date(_)) => Ordering::Less,
            (Date(_), Missing) => Ordering::Greater,
            _ => Ordering::Equal,
        }
    }
}

/// A record the table layer can filter, sort and search. `Field` is a small
/// per-screen enum; no stringly-typed reflection.
pub trait TableRecord {
    type Field: Copy + PartialEq;

    fn id(&self) -> &str;
    fn field(&self, field: Self::Field) -> FieldValue<'_>;
    /// The fixed set of haystacks the text search scans for this screen.
    fn search_text(&self) -> Vec<&str>;
}

/// One filter criterion. Empty selections and unset bounds mean "no
/// constraint", never "match nothing".
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Equals(String),
    OneOf(BTreeSet<String>),
    DateRange {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    NumberRange {
        min: Option<f64>,
        max: Option<f64>,
    },
}

impl Criterion {
    fn is_active(&self) -> bool {
        match self {
            Criterion::Equals(value) => !value.is_empty(),
            Criterion::OneOf(values) => !values.is_empty(),
            Criterion::DateRange { from, to } => from.is_some() || to.is_some(),
            Criterion::NumberRange { min, max } => min.is_some() || max.is_some(),
        }
    }

    /// Weight towards the active-filter badge: a multi-select counts each
    /// selected value, everything else counts once.
    fn active_weight(&self) -> usize {
        match self {
            Criterion::OneOf(values) => values.len(),
            other => usize::from(other.is_active()),
        }
    }

    fn matches(&self, value: FieldValue<'_>) -> bool {
        if !self.is_active() {
            return true;
        }
        match (self, value) {
            (Criterion::Equals(expected), FieldValue::Text(actual)) => expected == actual,
            (Criterion::OneOf(allowed), FieldValue::Text(actual)) => allowed.contains(actual),
            (Criterion::DateRange { from, to }, FieldValue::Date(actual)) => {
                from.map_or(true, |lo| actual >= lo) && to.map_or(true, |hi| actual <= hi)
            }
            (Criterion::NumberRange { min, max }, FieldValue::Number(actual)) => {
                min.map_or(true, |lo| actual >= lo) && max.map_or(true, |hi| actual <= hi)
            }
            // Missing values and type mismatches fail the (active) criterion.
            _ => false,
        }
    }
}

/// Named filter criteria plus the free-text search box, combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet<F: Copy + PartialEq> {
    search: String,
    criteria: Vec<(F, Criterion)>,
}

impl<F: Copy + PartialEq> Default for FilterSet<F> {
    fn default() -> Self {
        FilterSet {
            search: String::new(),
            criteria: Vec::new(),
        }
    }
}

impl<F: Copy + PartialEq> FilterSet<F> {
    pub fn set_search(&mut self, needle: impl Into<String>) {
        self.search = needle.into();
    }

    /// Replace the criterion for `field`. An inactive criterion (empty set,
    /// both bounds unset, empty equals) removes the entry instead.
    pub fn set(&mut self, field: F, criterion: Criterion) {
        self.criteria.retain(|(f, _)| *f != field);
        if criterion.is_active() {
            self.criteria.push((field, criterion));
        }
    }

    pub fn clear(&mut self, field: F) {
        self.criteria.retain(|(f, _)| *f != field);
    }

    pub fn get(&self, field: F) -> Option<&Criterion> {
        self.criteria
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, c)| c)
    }

    /// Number of non-default criteria, for the filter-count badge.
    pub fn count_active(&self) -> usize {
        let search = usize::from(!self.search.is_empty());
        search
            + self
                .criteria
                .iter()
                .map(|(_, c)| c.active_weight())
                .sum::<usize>()
    }

    pub fn matches<R>(&self, record: &R) -> bool
    where
        R: TableRecord<Field = F>,
    {
        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            let hit = record
                .search_text()
                .iter()
                .any(|hay| hay.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        self.criteria
            .iter()
            .all(|(field, criterion)| criterion.matches(record.field(*field)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortSpec<F> {
    pub field: F,
    pub direction: SortDirection,
}

/// The page of rows a screen actually renders, plus the counts its header
/// shows. Recomputed wholesale from the collection on every call.
#[derive(Debug)]
pub struct TableView<'a, R> {
    pub rows: Vec<&'a R>,
    pub filtered: usize,
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
}

pub const DEFAULT_TABLE_PAGE_SIZE: usize = 25;

/// User-adjustable view state for one screen: applied filters, a draft copy
/// for the advanced panel, sort, and client-side pagination of the filtered
/// set. Deriving the visible rows is a pure function of (collection, state).
#[derive(Debug, Clone)]
pub struct TableState<R: TableRecord> {
    applied: FilterSet<R::Field>,
    draft: FilterSet<R::Field>,
    sort: Option<SortSpec<R::Field>>,
    page: usize,
    page_size: usize,
}

impl<R: TableRecord> Default for TableState<R> {
    fn default() -> Self {
        TableState {
            applied: FilterSet::default(),
            draft: FilterSet::default(),
            sort: None,
            page: 1,
            page_size: DEFAULT_TABLE_PAGE_SIZE,
        }
    }
}

impl<R: TableRecord> TableState<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quick filters edit the applied set directly. Any change sends the user
    /// back to page 1 so they are never stranded on an out-of-range page.
    pub fn set_filter(&mut self, field: R::Field, criterion: Criterion) {
        self.applied.set(field, criterion);
        self.page = 1;
    }

    pub fn clear_filter(&mut self, field: R::Field) {
        self.applied.clear(field);
        self.page = 1;
    }

    pub fn set_search(&mut self, needle: impl Into<String>) {
        self.applied.set_search(needle);
        self.page = 1;
    }

    /// The advanced panel edits this copy; nothing takes effect until
    /// [`apply_draft`](Self::apply_draft).
    pub fn draft_mut(&mut self) -> &mut FilterSet<R::Field> {
        &mut self.draft
    }

    /// Atomically replace the applied set with the draft. Never a
    /// field-by-field merge.
    pub fn apply_draft(&mut self) {
        self.applied = self.draft.clone();
        self.page = 1;
    }

    /// Restore both draft and applied filters to their defaults.
    pub fn reset_filters(&mut self) {
        self.applied = FilterSet::default();
        self.draft = FilterSet::default();
        self.page = 1;
    }

    pub fn filters(&self) -> &FilterSet<R::Field> {
        &self.applied
    }

    pub fn count_active(&self) -> usize {
        self.applied.count_active()
    }

    /// Selecting the sorted field again flips the direction; a new field
    /// starts ascending.
    pub fn set_sort(&mut self, field: R::Field) {
        self.sort = match self.sort {
            Some(spec) if spec.field == field => Some(SortSpec {
                field,
                direction: match spec.direction {
                    SortDirection::Ascending => SortDirection::Descending,
                    SortDirection::Descending => SortDirection::Ascending,
                },
            }),
            _ => Some(SortSpec {
                field,
                direction: SortDirection::Ascending,
            }),
        };
    }

    pub fn sort(&self) -> Option<SortSpec<R::Field>> {
        self.sort
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Filter, stable-sort, then slice the current page out of `records`.
    /// The std sort is stable, so equal keys keep their input order.
    pub fn view<'a>(&self, records: &'a [R]) -> TableView<'a, R> {
        let mut rows: Vec<&R> = records.iter().filter(|r| self.applied.matches(*r)).collect();

        if let Some(spec) = self.sort {
            rows.sort_by(|a, b| {
                let ordering = a.field(spec.field).compare(&b.field(spec.field));
                match spec.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        let filtered = rows.len();
        let page_count = filtered.div_ceil(self.page_size).max(1);
        let page = self.page.min(page_count);
        let start = (page - 1) * self.page_size;
        let rows = rows
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect::<Vec<_>>();

        TableView {
            rows,
            filtered,
            total: records.len(),
            page,
            page_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestField {
        Name,
        Amount,
        Date,
    }

    #[derive(Debug, Clone)]
    struct Row {
        id: String,
        name: String,
        amount: Option<f64>,
        date: Option<NaiveDate>,
    }

    impl Row {
        fn new(id: &str, name: &str, amount: Option<f64>, date: Option<&str>) -> Self {
            Row {
                id: id.into(),
                name: name.into(),
                amount,
                date: date.map(|d| d.parse().expect("test date")),
            }
        }
    }

    impl TableRecord for Row {
        type Field = TestField;

        fn id(&self) -> &str {
            &self.id
        }

        fn field(&self, field: TestField) -> FieldValue<'_> {
            match field {
                TestField::Name => FieldValue::Text(&self.name),
                TestField::Amount => self
                    .amount
                    .map(FieldValue::Number)
                    .unwrap_or(FieldValue::Missing),
                TestField::Date => self
                    .date
                    .map(FieldValue::Date)
                    .unwrap_or(FieldValue::Missing),
            }
        }

        fn search_text(&self) -> Vec<&str> {
            vec![&self.name]
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row::new("1", "Cement bags", Some(1200.0), Some("2026-02-01")),
            Row::new("2", "Steel rods", Some(5400.0), Some("2026-02-10")),
            Row::new("3", "sand", Some(300.0), Some("2026-03-05")),
            Row::new("4", "Bricks", None, None),
        ]
    }

    #[test]
    fn default_state_shows_everything() {
        let state = TableState::<Row>::new();
        let data = rows();
        let view = state.view(&data);
        assert_eq!(view.filtered, 4);
        assert_eq!(view.total, 4);
        assert_eq!(view.rows.len(), 4);
        assert_eq!(state.count_active(), 0);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let mut state = TableState::<Row>::new();
        state.set_search("SAND");
        let data = rows();
        let view = state.view(&data);
        assert_eq!(view.filtered, 1);
        assert_eq!(view.rows[0].id(), "3");
    }

    #[test]
    fn number_range_skips_missing_amounts() {
        let mut state = TableState::<Row>::new();
        state.set_filter(
            TestField::Amount,
            Criterion::NumberRange {
                min: Some(0.0),
                max: None,
            },
        );
        let data = rows();
        let view = state.view(&data);
        // The amount-less brick row must not match, and must not panic.
        assert_eq!(view.filtered, 3);
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let mut state = TableState::<Row>::new();
        state.set_filter(
            TestField::Date,
            Criterion::DateRange {
                from: Some("2026-02-10".parse().expect("date")),
                to: Some("2026-03-05".parse().expect("date")),
            },
        );
        let data = rows();
        let view = state.view(&data);
        let ids: Vec<&str> = view.rows.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn filter_change_resets_page() {
        let mut state = TableState::<Row>::new();
        state.set_page_size(2);
        state.set_page(2);
        state.set_filter(TestField::Name, Criterion::Equals("sand".into()));
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn out_of_range_page_clamps_to_last() {
        let mut state = TableState::<Row>::new();
        state.set_page_size(3);
        state.set_page(9);
        let data = rows();
        let view = state.view(&data);
        assert_eq!(view.page, 2);
        assert_eq!(view.rows.len(), 1);
    }

    #[test]
    fn sort_toggles_direction_on_reselect() {
        let mut state = TableState::<Row>::new();
        state.set_sort(TestField::Amount);
        assert_eq!(
            state.sort().expect("sort set").direction,
            SortDirection::Ascending
        );
        state.set_sort(TestField::Amount);
        assert_eq!(
            state.sort().expect("sort set").direction,
            SortDirection::Descending
        );
        state.set_sort(TestField::Name);
        assert_eq!(
            state.sort().expect("sort set").direction,
            SortDirection::Ascending
        );
    }

    #[test]
    fn missing_values_sort_as_zero() {
        let mut state = TableState::<Row>::new();
        state.set_sort(TestField::Amount);
        let data = rows();
        let view = state.view(&data);
        // Brick row has no amount and sorts first ascending.
        assert_eq!(view.rows[0].id(), "4");
    }

    #[test]
    fn text_sort_ignores_case() {
        let mut state = TableState::<Row>::new();
        state.set_sort(TestField::Name);
        let data = rows();
        let view = state.view(&data);
        let names: Vec<&str> = view.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Bricks", "Cement bags", "sand", "Steel rods"]);
    }

    #[test]
    fn multi_select_counts_cardinality() {
        let mut state = TableState::<Row>::new();
        let mut selected = BTreeSet::new();
        selected.insert("Cement bags".to_string());
        selected.insert("Bricks".to_string());
        state.set_filter(TestField::Name, Criterion::OneOf(selected));
        state.set_filter(
            TestField::Amount,
            Criterion::NumberRange {
                min: Some(1.0),
                max: None,
            },
        );
        assert_eq!(state.count_active(), 3);
    }

    #[test]
    fn empty_multi_select_matches_everything() {
        let mut state = TableState::<Row>::new();
        state.set_filter(TestField::Name, Criterion::OneOf(BTreeSet::new()));
        let data = rows();
        assert_eq!(state.view(&data).filtered, 4);
        assert_eq!(state.count_active(), 0);
    }

    #[test]
    fn draft_changes_only_land_on_apply() {
        let mut state = TableState::<Row>::new();
        state
            .draft_mut()
            .set(TestField::Name, Criterion::Equals("sand".into()));

        let data = rows();
        assert_eq!(state.view(&data).filtered, 4, "draft not applied yet");

        state.apply_draft();
        assert_eq!(state.view(&data).filtered, 1);

        state.reset_filters();
        assert_eq!(state.view(&data).filtered, 4);
        assert_eq!(state.count_active(), 0);
    }
}
