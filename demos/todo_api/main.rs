//! A small todo API whose handler signatures are declared as YAML

use serde_json::{Value, json};
use tapas::prelude::*;

const SIGNATURES: &str = r#"
handlers:
  - name: get_todo
    params:
      - name: pk
        kind: integer
      - name: done
        kind: boolean
        default: false
  - name: list_todos
    params:
      - name: limit
        kind: integer
        default: 20
        minimum: 1
      - name: offset
        kind: integer
        default: 0
"#;

async fn get_todo(Converted(args): Converted) -> Json<Value> {
    Json(json!({
        "pk": args.get("pk"),
        "done": args.get("done"),
    }))
}

async fn list_todos(Converted(args): Converted) -> Json<Value> {
    Json(json!({
        "limit": args.get("limit"),
        "offset": args.get("offset"),
        "todos": [],
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = SignaturesConfig::from_yaml_str(SIGNATURES)?;
    let get_converter = Converter::new(config.signature("get_todo")?);
    let list_converter = Converter::new(config.signature("list_todos")?);

    let app = Router::new()
        .route("/todos", get(list_todos).layer(list_converter.layer()))
        .route("/todos/{pk}", get(get_todo).layer(get_converter.layer()));

    println!("🌐 Server running on http://127.0.0.1:3000");
    println!("\n📚 Routes:");
    println!("    GET /todos                - List todos (limit and offset fill from the query)");
    println!("    GET /todos/{{pk}}           - Get one todo (pk converts to an integer)");
    println!("\n🔍 Try:");
    println!("    curl http://127.0.0.1:3000/todos/42");
    println!("    curl http://127.0.0.1:3000/todos/42?done=1");
    println!("    curl http://127.0.0.1:3000/todos?limit=5");
    println!("    curl http://127.0.0.1:3000/todos/a1        # 400, detail names the field");
    println!("    curl http://127.0.0.1:3000/todos?limit=0   # 400, bound from the config");

    serve(app, "127.0.0.1:3000").await
}
