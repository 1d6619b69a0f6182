//! 圖書館資料庫示例

use gcbase::{row, CaptionSpec, Database, DatabaseMeta, MemoryStore, StoreConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== GCBase 圖書館示例 ===\n");

    let mut db = Database::new(
        DatabaseMeta::new("library", 1.0).with_description("作者與書籍"),
    )?;

    // 建立資料表
    db.add_table(
        "Authors",
        [("id", CaptionSpec::auto()), ("name", CaptionSpec::text())],
    )?;
    db.add_table(
        "Books",
        [
            ("title", CaptionSpec::text()),
            ("year", CaptionSpec::number()),
            ("authorId", CaptionSpec::link("Authors", "id", "name")),
        ],
    )?;

    db.insert_rows(
        "Authors",
        vec![
            row! { "name" => "Ada Lovelace" },
            row! { "name" => "Grace Hopper" },
        ],
    )?;
    db.table("Books", false)?
        .add(row! { "title" => "Notes", "year" => "1843", "authorId" => 0 })?
        .add(row! { "title" => "Compilers", "year" => 1952.7, "authorId" => 1 })?;

    let summary = db.rebuild_all()?;
    println!("{}", db.about());
    println!("重建順序: {:?}", summary.order);
    for (table, rows) in &summary.rows {
        println!("  - {}: {} 筆", table, rows);
    }

    let books = db.table("Books", false)?;
    println!("\nBooks 快取:\n{}", books.stringify()?);

    // 存入記憶體儲存區後重新載入
    let mut store = MemoryStore::new();
    let config = StoreConfig::new();
    db.save(&mut store, &config)?;
    let loaded = Database::load(&store, "library", &config)?;
    println!("\n重新載入: {} 個資料表", loaded.table_names().len());

    Ok(())
}
