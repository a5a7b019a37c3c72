use std::fs;

use hsmap_io::{load_candidates, load_query_engine, save_resolved, write_table, Table};
use hsmap_recon::{DisabledOracle, QueryOutcome, ReconConfig, ResolutionPipeline};
use tempfile::tempdir;

const CONFIG: &str = r#"
name = "catalog test"

[[countries]]
name = "美国"
resolved = "us_resolved.csv"
candidates = "us_candidates.csv"
foreign_code_column = "HS_Code_US"

[[countries]]
name = "日本"
resolved = "jp_resolved.xlsx"
foreign_code_column = "HS_Code_JP"

[[countries]]
name = "泰国"
resolved = "th_resolved.csv"
foreign_code_column = "HS_Code_TH"

[[countries]]
name = "越南"
resolved = "vn_resolved.csv"
foreign_code_column = "HS_Code_VN"
"#;

fn row(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn missing_file_and_missing_column_are_warnings() {
    let dir = tempdir().unwrap();
    let config = ReconConfig::from_toml(CONFIG).unwrap();

    fs::write(
        dir.path().join("us_resolved.csv"),
        "Product,HS_Code_China,商品名称,HS_Code_US,Desc,描述,选择方式\n\
         不锈钢螺栓,7318150000,螺栓,7318.15.20,Bolts,螺栓,model selection\n",
    )
    .unwrap();

    let jp = Table::new(
        row(&["Product", "HS_Code_China", "商品名称", "HS_Code_JP", "Desc", "描述"]),
        vec![row(&["不锈钢螺栓", "7318150000", "螺栓", "7318.15-000", "ボルト", "螺栓"])],
    );
    write_table(&jp, &dir.path().join("jp_resolved.xlsx")).unwrap();

    // Thailand lacks the translated description column.
    fs::write(
        dir.path().join("th_resolved.csv"),
        "Product,HS_Code_China,商品名称,HS_Code_TH,Desc\n不锈钢螺栓,7318150000,螺栓,73181510,Bolts\n",
    )
    .unwrap();
    // Vietnam's file does not exist.

    let (engine, warnings) = load_query_engine(&config, dir.path());

    let loaded: Vec<_> = engine.countries().collect();
    assert_eq!(loaded, vec!["美国", "日本"]);

    assert_eq!(warnings.len(), 2);
    assert_eq!(warnings[0].country, "泰国");
    assert!(warnings[0].message.contains("描述"));
    assert_eq!(warnings[1].country, "越南");
    assert!(warnings[1].message.contains("file not found"));

    let outcome = engine.exact_query("不锈钢螺栓");
    let found = outcome.found().unwrap();
    assert_eq!(found.rows.len(), 2);
    assert_eq!(found.rows[0].country, "日本");
    assert_eq!(found.rows[0].foreign_code, "7318.15-000");
    assert_eq!(found.domestic.len(), 1);
}

#[test]
fn resolve_save_and_query_back() {
    let dir = tempdir().unwrap();
    let config = ReconConfig::from_toml(CONFIG).unwrap();
    let us = config.country("美国").unwrap();

    fs::write(
        dir.path().join("us_candidates.csv"),
        "Product,HS_Code_China,HS_Code_US,Desc\n\
         马,0101210010,0101.21.0010,Purebred horses\n\
         马,0101210010,0101.21,Horses\n\
         茶叶,0902109000,0902.10.10,Green tea\n",
    )
    .unwrap();

    let records = load_candidates(&config, us, dir.path()).unwrap();
    assert_eq!(records.len(), 3);

    let run = ResolutionPipeline::new(DisabledOracle { reason: "offline".into() }).run(&us.name, records);
    let path = save_resolved(&run, &config, us, dir.path()).unwrap();
    assert!(path.ends_with("us_resolved.csv"));

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("fallback by code-digit-count"));
    assert!(written.contains("unique option"));

    let (engine, _warnings) = load_query_engine(&config, dir.path());
    let outcome = engine.exact_query("马");
    let found = outcome.found().unwrap();
    assert_eq!(found.rows[0].foreign_code, "0101.21");
    assert_eq!(found.domestic[0].code, "0101210010");

    assert!(matches!(engine.fuzzy_query("咖啡"), QueryOutcome::NotFound { .. }));
}

#[test]
fn candidates_not_configured_is_a_warning() {
    let dir = tempdir().unwrap();
    let config = ReconConfig::from_toml(CONFIG).unwrap();
    let jp = config.country("日本").unwrap();
    let err = load_candidates(&config, jp, dir.path()).unwrap_err();
    assert_eq!(err.country, "日本");
}
