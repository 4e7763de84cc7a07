//! Localization rewrite integration tests
//!
//! Build small gameplay / localization databases in a temp directory and
//! run the full rewrite against them.

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wemkit_loc::rewrite::LOG_FILE_NAME;
use wemkit_loc::{translate_to_language, RewriteError, RewriteOptions};

async fn create_db(path: &Path, schema: &str) {
    let mut conn = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .connect()
        .await
        .unwrap();
    sqlx::raw_sql(schema).execute(&mut conn).await.unwrap();
    conn.close().await.unwrap();
}

async fn open(path: &Path) -> SqliteConnection {
    SqliteConnectOptions::new().filename(path).connect().await.unwrap()
}

/// (gameplay, localization) inside `temp`
async fn fixture(temp: &TempDir) -> (PathBuf, PathBuf) {
    let gameplay = temp.path().join("DebugGameplay.sqlite");
    let localization = temp.path().join("DebugLocalization.sqlite");

    create_db(
        &gameplay,
        r#"
        CREATE TABLE Units (UnitType TEXT PRIMARY KEY, Name TEXT UNIQUE, Cost INTEGER);
        INSERT INTO Units VALUES ('UNIT_WARRIOR', 'LOC_UNIT_WARRIOR_NAME', 40);
        INSERT INTO Units VALUES ('UNIT_SCOUT', 'LOC_UNIT_SCOUT_NAME', 30);
        INSERT INTO Units VALUES ('UNIT_SLINGER', 'LOC_UNIT_SLINGER_NAME', 35);
        INSERT INTO Units VALUES ('UNIT_ARCHER', 'LOC_UNIT_ARCHER_NAME', 60);
        INSERT INTO Units VALUES ('UNIT_SPEARMAN', '[ICON_Strength]Spear', 65);
        INSERT INTO Units VALUES ('UNIT_PIKEMAN', 'LOC_UNIT_PIKEMAN_NAME', 80);

        CREATE TABLE Civilizations (CivilizationType TEXT, Description);
        INSERT INTO Civilizations VALUES ('CIVILIZATION_ROME', 'LOC_CIVILIZATION_ROME_DESCRIPTION');

        CREATE TABLE Numbers (Id INTEGER, Value INTEGER);
        INSERT INTO Numbers VALUES (1, 2);

        CREATE TABLE Tags (Tag TEXT PRIMARY KEY, Vocabulary TEXT) WITHOUT ROWID;
        INSERT INTO Tags VALUES ('LOC_TAG_MELEE', 'ABILITY_CLASS');
        "#,
    )
    .await;

    create_db(
        &localization,
        r#"
        CREATE TABLE LocalizedText (Language TEXT, Tag TEXT, Text TEXT, PRIMARY KEY (Language, Tag));
        INSERT INTO LocalizedText VALUES ('zh_Hans_CN', 'LOC_UNIT_WARRIOR_NAME', '勇士');
        INSERT INTO LocalizedText VALUES ('zh_Hans_CN', 'LOC_UNIT_SCOUT_NAME', '勇士');
        INSERT INTO LocalizedText VALUES ('zh_Hans_CN', 'LOC_UNIT_ARCHER_NAME', '   ');
        INSERT INTO LocalizedText VALUES ('zh_Hans_CN', 'LOC_UNIT_PIKEMAN_NAME', '[ICON_Strength]Spear');
        INSERT INTO LocalizedText VALUES ('zh_Hans_CN', 'LOC_CIVILIZATION_ROME_DESCRIPTION', '{1_Adj} [ICON_Capital]罗马帝国');
        INSERT INTO LocalizedText VALUES ('fr_FR', 'LOC_UNIT_WARRIOR_NAME', 'Guerrier');
        "#,
    )
    .await;

    (gameplay, localization)
}

fn options(gameplay: &Path, localization: &Path, language: &str) -> RewriteOptions {
    RewriteOptions {
        target_language: language.to_string(),
        gameplay_db: gameplay.to_path_buf(),
        localization_db: localization.to_path_buf(),
        batch_size: 2,
    }
}

async fn unit_name(conn: &mut SqliteConnection, unit: &str) -> String {
    sqlx::query_scalar("SELECT Name FROM Units WHERE UnitType = ?")
        .bind(unit)
        .fetch_one(&mut *conn)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_rewrite_replaces_resolvable_tags() {
    let temp = TempDir::new().unwrap();
    let (gameplay, localization) = fixture(&temp).await;

    let report = translate_to_language(&options(&gameplay, &localization, "zh_Hans_CN"))
        .await
        .unwrap();

    assert_eq!(
        report.output_path.file_name().unwrap(),
        "DebugGameplay_zh_Hans_CN.sqlite"
    );
    assert_eq!(report.tables_scanned, 3);
    assert_eq!(report.tables_skipped, 1);
    assert_eq!(report.columns_rewritten, 2);
    assert_eq!(report.rows_updated, 2);
    // Slinger has no translation, Archer's is blank
    assert_eq!(report.unresolved, 2);
    // Scout duplicates Warrior's new name; Pikeman hits the UNIQUE constraint
    assert_eq!(report.conflicts, 2);

    let mut conn = open(&report.output_path).await;
    assert_eq!(unit_name(&mut conn, "UNIT_WARRIOR").await, "勇士");
    assert_eq!(unit_name(&mut conn, "UNIT_SCOUT").await, "LOC_UNIT_SCOUT_NAME");
    assert_eq!(unit_name(&mut conn, "UNIT_SLINGER").await, "LOC_UNIT_SLINGER_NAME");
    assert_eq!(unit_name(&mut conn, "UNIT_ARCHER").await, "LOC_UNIT_ARCHER_NAME");
    assert_eq!(unit_name(&mut conn, "UNIT_PIKEMAN").await, "LOC_UNIT_PIKEMAN_NAME");

    // Stored text keeps its markup; only the collision check uses cleaned text
    let rome: String = sqlx::query_scalar("SELECT Description FROM Civilizations")
        .fetch_one(&mut conn)
        .await
        .unwrap();
    assert_eq!(rome, "{1_Adj} [ICON_Capital]罗马帝国");
}

#[tokio::test]
async fn test_source_database_untouched() {
    let temp = TempDir::new().unwrap();
    let (gameplay, localization) = fixture(&temp).await;
    let before = std::fs::read(&gameplay).unwrap();

    translate_to_language(&options(&gameplay, &localization, "zh_Hans_CN"))
        .await
        .unwrap();

    let mut conn = open(&gameplay).await;
    assert_eq!(unit_name(&mut conn, "UNIT_WARRIOR").await, "LOC_UNIT_WARRIOR_NAME");
    conn.close().await.unwrap();
    assert_eq!(std::fs::read(&gameplay).unwrap(), before);
}

#[tokio::test]
async fn test_log_records_skipped_values() {
    let temp = TempDir::new().unwrap();
    let (gameplay, localization) = fixture(&temp).await;

    let report = translate_to_language(&options(&gameplay, &localization, "zh_Hans_CN"))
        .await
        .unwrap();

    assert_eq!(report.log_path, temp.path().canonicalize().unwrap().join(LOG_FILE_NAME));
    let log = std::fs::read_to_string(&report.log_path).unwrap();
    assert_eq!(log.lines().filter(|l| l.starts_with("[unresolved]")).count(), 2);
    assert_eq!(log.lines().filter(|l| l.starts_with("[conflict]")).count(), 2);
    assert!(log.contains("LOC_UNIT_SLINGER_NAME"));

    // A second run starts from a fresh copy and appends to the same log
    let again = translate_to_language(&options(&gameplay, &localization, "zh_Hans_CN"))
        .await
        .unwrap();
    assert_eq!(again.rows_updated, report.rows_updated);
    let log = std::fs::read_to_string(&again.log_path).unwrap();
    assert_eq!(log.lines().count(), 8);
}

#[tokio::test]
async fn test_other_language_uses_its_own_copy() {
    let temp = TempDir::new().unwrap();
    let (gameplay, localization) = fixture(&temp).await;

    let report = translate_to_language(&options(&gameplay, &localization, "fr_FR"))
        .await
        .unwrap();

    assert_eq!(report.output_path.file_name().unwrap(), "DebugGameplay_fr_FR.sqlite");
    assert_eq!(report.rows_updated, 1);
    let mut conn = open(&report.output_path).await;
    assert_eq!(unit_name(&mut conn, "UNIT_WARRIOR").await, "Guerrier");
}

#[tokio::test]
async fn test_missing_localization_database() {
    let temp = TempDir::new().unwrap();
    let (gameplay, _) = fixture(&temp).await;

    let err = translate_to_language(&options(&gameplay, &temp.path().join("absent.sqlite"), "zh_Hans_CN"))
        .await
        .unwrap_err();
    assert!(matches!(err, RewriteError::NotFound(_)));
}

#[tokio::test]
async fn test_missing_gameplay_database() {
    let temp = TempDir::new().unwrap();
    let (_, localization) = fixture(&temp).await;

    let err = translate_to_language(&options(&temp.path().join("absent.sqlite"), &localization, "zh_Hans_CN"))
        .await
        .unwrap_err();
    assert!(matches!(err, RewriteError::NotFound(_)));
}

#[tokio::test]
async fn test_tag_shared_by_several_rows_translated_everywhere() {
    let temp = TempDir::new().unwrap();
    let gameplay = temp.path().join("Gameplay.sqlite");
    let localization = temp.path().join("Localization.sqlite");

    create_db(
        &gameplay,
        r#"
        CREATE TABLE Abilities (AbilityType TEXT PRIMARY KEY, Description TEXT);
        INSERT INTO Abilities VALUES ('ABILITY_WARRIOR', 'LOC_SHARED_DESC');
        INSERT INTO Abilities VALUES ('ABILITY_SWORDSMAN', 'LOC_SHARED_DESC');
        INSERT INTO Abilities VALUES ('ABILITY_MAN_AT_ARMS', 'LOC_SHARED_DESC');
        INSERT INTO Abilities VALUES ('ABILITY_LEGION', 'LOC_LEGION_DESC');
        "#,
    )
    .await;
    create_db(
        &localization,
        r#"
        CREATE TABLE LocalizedText (Language TEXT, Tag TEXT, Text TEXT, PRIMARY KEY (Language, Tag));
        INSERT INTO LocalizedText VALUES ('zh_Hans_CN', 'LOC_SHARED_DESC', '近战单位');
        INSERT INTO LocalizedText VALUES ('zh_Hans_CN', 'LOC_LEGION_DESC', '[ICON_Strength]近战单位');
        "#,
    )
    .await;

    // Batches of 2 split the shared rows across transactions
    let report = translate_to_language(&options(&gameplay, &localization, "zh_Hans_CN"))
        .await
        .unwrap();

    assert_eq!(report.rows_updated, 3);
    // A different tag whose cleaned text matches is still a collision
    assert_eq!(report.conflicts, 1);
    assert_eq!(report.unresolved, 0);

    let mut conn = open(&report.output_path).await;
    let values: Vec<String> = sqlx::query_scalar("SELECT Description FROM Abilities ORDER BY rowid")
        .fetch_all(&mut conn)
        .await
        .unwrap();
    assert_eq!(values, vec!["近战单位", "近战单位", "近战单位", "LOC_LEGION_DESC"]);
}
