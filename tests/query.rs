#[cfg(test)]
mod tests {
    use chrono::{Local, Timelike};
    use taskhive::libs::query::{start_of_day, TaskQuery};
    use uuid::Uuid;

    #[test]
    fn test_id_query_renders_quoted_string_equality() {
        let id = Uuid::new_v4();
        let query = TaskQuery::id_is(id);

        assert_eq!(query.to_string(), format!("(id == \"{}\")", id));
    }

    #[test]
    fn test_day_query_renders_a_conjunction() {
        let today = Local::now().date_naive();
        let rendered = TaskQuery::due_on(today).to_string();

        assert!(rendered.contains("(due_date >= "));
        assert!(rendered.contains(" AND "));
        assert!(rendered.contains("(due_date < "));
    }

    #[test]
    fn test_rollover_query_renders_ticked_and_id_exclusion() {
        let today = Local::now().date_naive();
        let exclude = vec![Uuid::new_v4(), Uuid::new_v4()];
        let rendered = TaskQuery::overdue_unticked(today, &exclude).to_string();

        assert!(rendered.contains("(ticked == false)"));
        assert!(rendered.contains("(NOT (id IN {"));
        assert!(rendered.contains(&format!("\"{}\"", exclude[0])));
    }

    #[test]
    fn test_rollover_query_without_exclusions_has_no_in_clause() {
        let today = Local::now().date_naive();
        let rendered = TaskQuery::overdue_unticked(today, &[]).to_string();

        assert!(!rendered.contains("IN"));
    }

    #[test]
    fn test_id_set_query_renders_membership() {
        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        let query = TaskQuery::ids_in(&ids);

        assert_eq!(query.to_string(), format!("(id IN {{\"{}\", \"{}\"}})", ids[0], ids[1]));

        let (clause, params) = query.to_sql();
        assert_eq!(clause, "id IN (?, ?)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let query = TaskQuery::all();
        assert!(query.is_empty());

        let (clause, params) = query.to_sql();
        assert!(clause.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn test_sql_rendering_binds_every_operand() {
        let today = Local::now().date_naive();
        let exclude = vec![Uuid::new_v4(), Uuid::new_v4()];

        let (clause, params) = TaskQuery::overdue_unticked(today, &exclude).to_sql();
        assert_eq!(clause, "due_date < ? AND ticked = ? AND id NOT IN (?, ?)");
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_day_query_sql() {
        let today = Local::now().date_naive();

        let (clause, params) = TaskQuery::due_on(today).to_sql();
        assert_eq!(clause, "due_date >= ? AND due_date < ?");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_start_of_day_truncates_time() {
        let start = start_of_day(Local::now().date_naive());
        assert_eq!(start.hour(), 0);
        assert_eq!(start.minute(), 0);
        assert_eq!(start.second(), 0);
    }
}
