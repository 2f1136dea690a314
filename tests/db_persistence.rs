#[cfg(test)]
mod tests {
    use chatrelay::config::DatabaseConfig;
    use chatrelay::db::connection;
    use chatrelay::db::service::DbService;
    use chatrelay::db::{PresetFields, PresetSummary};

    fn get_test_db() -> duckdb::Connection {
        let conn = duckdb::Connection::open_in_memory().unwrap();
        connection::init_schema(&conn).unwrap();
        conn
    }

    fn default_preset() -> PresetFields {
        PresetFields {
            name: Some("default".to_string()),
            model: Some("gpt-4".to_string()),
            temperature: Some(0.2),
            max_tokens: Some(2086),
            top_p: Some(1.0),
            presence_penalty: Some(0.0),
            frequency_penalty: Some(0.0),
            n: Some(1),
            system_message: Some(String::new()),
        }
    }

    #[test]
    fn test_get_connection_in_memory() {
        let config = DatabaseConfig {
            path: ":memory:".to_string(),
        };
        let pool = connection::get_connection(&config).unwrap();
        let conn = chatrelay::db::lock(&pool);
        assert!(DbService::list_presets(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_create_then_read_matches_input() {
        let conn = get_test_db();
        let fields = PresetFields {
            name: Some("creative".to_string()),
            model: Some("gpt-4o".to_string()),
            temperature: Some(1.3),
            max_tokens: Some(512),
            top_p: Some(0.9),
            presence_penalty: Some(0.6),
            frequency_penalty: Some(-0.4),
            n: Some(3),
            system_message: Some("You are a poet.".to_string()),
        };

        let id = DbService::insert_preset(&conn, &fields).unwrap();
        let preset = DbService::get_preset(&conn, id).unwrap().unwrap();

        assert_eq!(preset.id, id);
        assert_eq!(preset.name, "creative");
        assert_eq!(preset.model, "gpt-4o");
        assert_eq!(preset.temperature, 1.3);
        assert_eq!(preset.max_tokens, 512);
        assert_eq!(preset.top_p, 0.9);
        assert_eq!(preset.presence_penalty, 0.6);
        assert_eq!(preset.frequency_penalty, -0.4);
        assert_eq!(preset.n, 3);
        assert_eq!(preset.system_message, "You are a poet.");
    }

    #[test]
    fn test_ids_are_generated_in_sequence() {
        let conn = get_test_db();
        let first = DbService::insert_preset(&conn, &default_preset()).unwrap();
        let second = DbService::insert_preset(&conn, &default_preset()).unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[test]
    fn test_missing_ids_are_not_found() {
        let conn = get_test_db();
        assert!(DbService::get_preset(&conn, 42).unwrap().is_none());
        assert_eq!(DbService::update_preset(&conn, 42, &default_preset()).unwrap(), 0);
        assert_eq!(DbService::delete_preset(&conn, 42).unwrap(), 0);
    }

    #[test]
    fn test_update_rewrites_every_field() {
        let conn = get_test_db();
        let id = DbService::insert_preset(&conn, &default_preset()).unwrap();

        let replacement = PresetFields {
            name: Some("renamed".to_string()),
            model: Some("gpt-3.5-turbo".to_string()),
            temperature: Some(0.8),
            max_tokens: Some(100),
            top_p: Some(0.5),
            presence_penalty: Some(1.0),
            frequency_penalty: Some(2.0),
            n: Some(4),
            system_message: Some("terse".to_string()),
        };
        assert_eq!(DbService::update_preset(&conn, id, &replacement).unwrap(), 1);

        let preset = DbService::get_preset(&conn, id).unwrap().unwrap();
        assert_eq!(preset.name, "renamed");
        assert_eq!(preset.model, "gpt-3.5-turbo");
        assert_eq!(preset.temperature, 0.8);
        assert_eq!(preset.max_tokens, 100);
        assert_eq!(preset.top_p, 0.5);
        assert_eq!(preset.presence_penalty, 1.0);
        assert_eq!(preset.frequency_penalty, 2.0);
        assert_eq!(preset.n, 4);
        assert_eq!(preset.system_message, "terse");
    }

    #[test]
    fn test_list_returns_only_live_summaries() {
        let conn = get_test_db();
        let a = DbService::insert_preset(&conn, &default_preset()).unwrap();
        let mut other = default_preset();
        other.name = Some("other".to_string());
        let b = DbService::insert_preset(&conn, &other).unwrap();

        assert_eq!(DbService::delete_preset(&conn, a).unwrap(), 1);

        let list = DbService::list_presets(&conn).unwrap();
        assert_eq!(
            list,
            vec![PresetSummary {
                id: b,
                name: "other".to_string()
            }]
        );
    }

    #[test]
    fn test_missing_field_violates_constraint() {
        let conn = get_test_db();
        let mut fields = default_preset();
        fields.model = None;

        let err = DbService::insert_preset(&conn, &fields).unwrap_err();
        assert!(err.to_string().to_lowercase().contains("not null"), "{}", err);
        assert!(DbService::list_presets(&conn).unwrap().is_empty());
    }
}
