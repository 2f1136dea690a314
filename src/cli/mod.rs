pub mod commands;

use crate::cli::commands::PresetAction;
use crate::config::AppConfig;
use crate::db::{self, get_connection, service::DbService, PresetFields};

pub fn run_preset_command(action: PresetAction, config: &AppConfig) {
    let pool = match get_connection(&config.database) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Failed to open preset store: {}", e);
            return;
        }
    };
    let conn = db::lock(&pool);

    match action {
        PresetAction::Create {
            name,
            model,
            temperature,
            max_tokens,
            top_p,
            presence_penalty,
            frequency_penalty,
            n,
            system_message,
        } => {
            let fields = PresetFields {
                name: Some(name.clone()),
                model: Some(model),
                temperature: Some(temperature),
                max_tokens: Some(max_tokens),
                top_p: Some(top_p),
                presence_penalty: Some(presence_penalty),
                frequency_penalty: Some(frequency_penalty),
                n: Some(n),
                system_message: Some(system_message),
            };
            match DbService::insert_preset(&conn, &fields) {
                Ok(id) => println!("Created preset: {} ({})", name, id),
                Err(e) => eprintln!("Error: {}", e),
            }
        }
        PresetAction::List => match DbService::list_presets(&conn) {
            Ok(presets) if presets.is_empty() => println!("No presets found."),
            Ok(presets) => {
                println!("{:<8} | Name", "ID");
                println!("{:-<8}-+-{:-<20}", "", "");
                for p in presets {
                    println!("{:<8} | {}", p.id, p.name);
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        },
        PresetAction::Show { id } => match DbService::get_preset(&conn, id) {
            Ok(Some(preset)) => match serde_json::to_string_pretty(&preset) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error: {}", e),
            },
            Ok(None) => eprintln!("Preset {} not found.", id),
            Err(e) => eprintln!("Error: {}", e),
        },
        PresetAction::Delete { id } => match DbService::delete_preset(&conn, id) {
            Ok(0) => eprintln!("Preset {} not found.", id),
            Ok(_) => println!("Deleted preset {}", id),
            Err(e) => eprintln!("Error: {}", e),
        },
    }
}
