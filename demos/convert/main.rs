//! Walk through argument conversion without a server

use tapas::prelude::*;

fn supplied(pairs: &[(&str, &str)]) -> RawArgs {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("🚀 Tapas Conversion Demo\n");

    // Declare a signature once, as a value
    let signature = Signature::builder()
        .param("pk", ScalarType::Integer)
        .param("price", ScalarType::Decimal)
        .param_with_default("done", ScalarType::Boolean, "false")
        .validator_with_default("limit", IntegerField::new().minimum(1), "20")
        .text("note")
        .build();
    let converter = Converter::new(signature.clone());

    println!("📋 Converting a full set of raw values...\n");

    let args = converter.convert(supplied(&[
        ("pk", "42"),
        ("price", "19.99"),
        ("done", "TRUE"),
        ("note", "pick up milk"),
    ]))?;
    println!("✅ pk     = {:?}", args.integer("pk"));
    println!("✅ price  = {:?}", args.decimal("price"));
    println!("✅ done   = {:?}", args.boolean("done"));
    println!("✅ limit  = {:?} (filled from the default)", args.integer("limit"));
    println!("✅ note   = {:?} (unannotated, passes through)\n", args.text("note"));

    println!("🔍 Converting values that cannot validate...\n");

    // Every failing field is collected before the pass fails
    let error = converter
        .convert(supplied(&[
            ("pk", "a1"),
            ("price", "free"),
            ("done", "maybe"),
            ("note", "ok"),
            ("limit", "0"),
        ]))
        .expect_err("several fields fail at once");
    for field_error in error.errors() {
        println!("❌ {field_error}");
    }
    println!(
        "\n   As an HTTP payload: {}\n",
        serde_json::to_string_pretty(&error.detail())?
    );

    println!("🎁 Wrapping a handler...\n");

    // The handler keeps its calling convention; conversion runs first
    let wrapped = convert_arguments(signature, |args: Args| async move {
        format!(
            "todo #{} (limit {})",
            args.integer("pk").unwrap_or_default(),
            args.integer("limit").unwrap_or_default(),
        )
    });

    let line = wrapped
        .call(supplied(&[("pk", "7"), ("price", "0.50"), ("note", "x")]))
        .await?;
    println!("✅ Handler returned: {line}");

    let rejected = wrapped.call(supplied(&[("pk", "a1")])).await;
    println!("❌ Handler never ran for: {:?}", rejected.err().map(|e| e.fields().join(", ")));

    println!("\n✨ Demo completed successfully!");

    Ok(())
}
