//! Predicate representation for task queries.
//!
//! A [`TaskQuery`] is a conjunction of field comparisons. It renders in two
//! ways: the textual form `"(due_date >= ...) AND (ticked == false)"` that
//! crosses the wire to the remote store, and a SQL `WHERE` fragment with bound
//! parameters for the local store. Callers build queries through the named
//! constructors instead of assembling strings.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use rusqlite::types::Value as SqlValue;
use std::fmt;
use uuid::Uuid;

/// Storage format for timestamps in the local store: UTC, fixed-width
/// fractional seconds, so that text comparison matches chronological order
/// and values round-trip without precision loss.
const SQL_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";

/// Renders a timestamp the way the local store persists it.
pub(crate) fn sql_date(date: &DateTime<Local>) -> String {
    date.with_timezone(&Utc).format(SQL_DATE_FORMAT).to_string()
}

/// Parses a timestamp persisted by [`sql_date`] back into local time.
pub(crate) fn parse_sql_date(raw: &str) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(raw, SQL_DATE_FORMAT).ok()?;
    Some(Utc.from_utc_datetime(&naive).with_timezone(&Local))
}

/// Fields a query may compare on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    DueDate,
    Ticked,
}

impl Field {
    fn name(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::DueDate => "due_date",
            Field::Ticked => "ticked",
        }
    }
}

#[derive(Debug, Clone)]
enum Comparison {
    Eq(Field, Operand),
    Ge(Field, Operand),
    Lt(Field, Operand),
    In(Field, Vec<Operand>),
    NotIn(Field, Vec<Operand>),
}

#[derive(Debug, Clone)]
enum Operand {
    Date(DateTime<Local>),
    Bool(bool),
    Id(Uuid),
}

impl Operand {
    /// Literal in the textual boundary form. Dates are RFC 3339 in local
    /// time, ids are quoted strings.
    fn render(&self) -> String {
        match self {
            Operand::Date(date) => date.to_rfc3339_opts(SecondsFormat::Secs, false),
            Operand::Bool(value) => value.to_string(),
            Operand::Id(id) => format!("\"{}\"", id),
        }
    }

    fn to_sql(&self) -> SqlValue {
        match self {
            Operand::Date(date) => SqlValue::Text(sql_date(date)),
            Operand::Bool(value) => SqlValue::Integer(*value as i64),
            Operand::Id(id) => SqlValue::Text(id.to_string()),
        }
    }
}

/// A conjunction of comparisons over task fields.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    comparisons: Vec<Comparison>,
}

impl TaskQuery {
    /// Matches every task.
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches the task with the given id.
    pub fn id_is(id: Uuid) -> Self {
        Self {
            comparisons: vec![Comparison::Eq(Field::Id, Operand::Id(id))],
        }
    }

    /// Matches tasks whose id is in the given set.
    pub fn ids_in(ids: &[Uuid]) -> Self {
        Self {
            comparisons: vec![Comparison::In(Field::Id, ids.iter().copied().map(Operand::Id).collect())],
        }
    }

    /// Matches tasks due on the given calendar day:
    /// `(due_date >= day 00:00) AND (due_date < next day 00:00)`.
    pub fn due_on(day: NaiveDate) -> Self {
        Self {
            comparisons: vec![
                Comparison::Ge(Field::DueDate, Operand::Date(start_of_day(day))),
                Comparison::Lt(Field::DueDate, Operand::Date(start_of_day(day + chrono::Days::new(1)))),
            ],
        }
    }

    /// Matches unticked tasks that were due before the given day, excluding
    /// the given ids. This is the rollover sweep query.
    pub fn overdue_unticked(today: NaiveDate, exclude: &[Uuid]) -> Self {
        let mut comparisons = vec![
            Comparison::Lt(Field::DueDate, Operand::Date(start_of_day(today))),
            Comparison::Eq(Field::Ticked, Operand::Bool(false)),
        ];
        if !exclude.is_empty() {
            comparisons.push(Comparison::NotIn(Field::Id, exclude.iter().copied().map(Operand::Id).collect()));
        }
        Self { comparisons }
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    /// SQL `WHERE` fragment plus bound parameter values, in order. Empty
    /// string when the query matches everything.
    pub fn to_sql(&self) -> (String, Vec<SqlValue>) {
        let mut clauses = Vec::with_capacity(self.comparisons.len());
        let mut params = Vec::new();

        for comparison in &self.comparisons {
            match comparison {
                Comparison::Eq(field, operand) => {
                    clauses.push(format!("{} = ?", field.name()));
                    params.push(operand.to_sql());
                }
                Comparison::Ge(field, operand) => {
                    clauses.push(format!("{} >= ?", field.name()));
                    params.push(operand.to_sql());
                }
                Comparison::Lt(field, operand) => {
                    clauses.push(format!("{} < ?", field.name()));
                    params.push(operand.to_sql());
                }
                Comparison::In(field, operands) => {
                    clauses.push(format!("{} IN ({})", field.name(), vec!["?"; operands.len()].join(", ")));
                    params.extend(operands.iter().map(Operand::to_sql));
                }
                Comparison::NotIn(field, operands) => {
                    clauses.push(format!("{} NOT IN ({})", field.name(), vec!["?"; operands.len()].join(", ")));
                    params.extend(operands.iter().map(Operand::to_sql));
                }
            }
        }

        (clauses.join(" AND "), params)
    }
}

impl fmt::Display for TaskQuery {
    /// The textual boundary form, e.g.
    /// `(due_date >= 2024-01-10T00:00:00+02:00) AND (ticked == false)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .comparisons
            .iter()
            .map(|comparison| match comparison {
                Comparison::Eq(field, operand) => format!("({} == {})", field.name(), operand.render()),
                Comparison::Ge(field, operand) => format!("({} >= {})", field.name(), operand.render()),
                Comparison::Lt(field, operand) => format!("({} < {})", field.name(), operand.render()),
                Comparison::In(field, operands) => format!("({} IN {{{}}})", field.name(), render_set(operands)),
                Comparison::NotIn(field, operands) => format!("(NOT ({} IN {{{}}}))", field.name(), render_set(operands)),
            })
            .collect();

        write!(f, "{}", rendered.join(" AND "))
    }
}

fn render_set(operands: &[Operand]) -> String {
    operands.iter().map(Operand::render).collect::<Vec<_>>().join(", ")
}

/// Midnight at the start of the given day, in the local timezone.
pub fn start_of_day(day: NaiveDate) -> DateTime<Local> {
    day.and_hms_opt(0, 0, 0)
        .unwrap()
        .and_local_timezone(Local)
        .earliest()
        // Midnight can be skipped by a DST jump; fall back to the next hour.
        .or_else(|| day.and_hms_opt(1, 0, 0).unwrap().and_local_timezone(Local).earliest())
        .unwrap_or_else(Local::now)
}
