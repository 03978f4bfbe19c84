//! End-to-end normalization tests over complete documents
//!
//! Tests cover:
//! - Full document with every recognized section
//! - Repeated sections (scalar overwrite, list accumulation)
//! - Series inference through the known-prefix table
//! - Document-level failures producing placeholder records

use gdx_common::normalize::normalize_file;
use gdx_common::DurationTier;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const FULL_DOCUMENT: &str = r#"---
title: Senren Banka
abbrlink: senren
date: 2023-01-05 10:00:00
---
[编辑此页面](https://example.com/edit)

## 游戏封面
![cover](/images/senren/cover.webp)

## 游戏名称
- 日文：千恋＊万花
- 英文：Senren * Banka
- 中文：千恋万花
- 别名：SB, 千恋

## 游戏信息
- 时长：约 35h
- 开发者：Yuzusoft
- 发售日期：2016.07.29
- 游戏平台：PC, Switch
- 相关作品：
  - 同社作品：Riddle Joker
  - 系列：Senren Banka FD

## 游戏简介
[编辑此页面](https://example.com/edit)
穗织是一座温泉小镇。

主人公在这里度过了夏天。

## 下载链接
- [Baidu](https://pan.example.com/s/abc)
- 解压密码：yuzu
- [Mega](https://mega.example.com/x)

## 游戏截图
![s1](/images/senren/1.webp)
![s2](/images/senren/2.webp)

## 备注
Unrecognized sections are ignored.
"#;

fn write_doc(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

// =============================================================================
// Full document
// =============================================================================

#[test]
fn test_full_document() {
    let dir = tempfile::tempdir().unwrap();
    let record = normalize_file(&write_doc(&dir, "senren.md", FULL_DOCUMENT));

    assert_eq!(record.id, "senren");
    assert_eq!(record.source_filename, "senren.md");
    assert_eq!(record.title, "Senren Banka");
    assert_eq!(record.date.as_deref(), Some("2023-01-05 10:00:00"));
    assert_eq!(record.cover_image.as_deref(), Some("/images/senren/cover.webp"));

    assert_eq!(record.names.japanese.as_deref(), Some("千恋＊万花"));
    assert_eq!(record.names.english.as_deref(), Some("Senren * Banka"));
    assert_eq!(record.names.chinese.as_deref(), Some("千恋万花"));
    assert_eq!(record.names.aliases, vec!["SB", "千恋"]);

    assert_eq!(record.info.duration_hours, Some(35.0));
    assert_eq!(record.info.duration_tier, DurationTier::Long);
    assert_eq!(record.info.developer.as_deref(), Some("Yuzusoft"));
    assert_eq!(record.info.release_date.as_deref(), Some("2016-07-29"));
    assert_eq!(record.info.platforms, vec!["PC", "Switch"]);
    assert_eq!(record.info.related_works.len(), 2);
    assert_eq!(record.info.related_works[1].kind, "系列");
    assert_eq!(record.series_name.as_deref(), Some("Senren"));

    assert_eq!(
        record.description.as_deref(),
        Some("穗织是一座温泉小镇。\n主人公在这里度过了夏天。")
    );

    assert_eq!(record.download_links.len(), 2);
    assert_eq!(record.download_links[0].password.as_deref(), Some("yuzu"));
    assert_eq!(record.download_links[1].password, None);

    assert_eq!(
        record.screenshots,
        vec!["/images/senren/1.webp", "/images/senren/2.webp"]
    );
    assert!(!record.parse_error);
    assert_eq!(record.parse_warning, None);
    assert_eq!(record.display_title(), "千恋万花");
}

#[test]
fn test_record_json_shape() {
    let dir = tempfile::tempdir().unwrap();
    let record = normalize_file(&write_doc(&dir, "senren.md", FULL_DOCUMENT));
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["id"], "senren");
    assert_eq!(json["info"]["duration_tier"], "长篇");
    assert_eq!(json["info"]["related_works"][0]["type"], "同社作品");
    assert_eq!(json["download_links"][1]["password"], serde_json::Value::Null);
    assert_eq!(json["parse_error"], false);
}

// =============================================================================
// Repeated sections
// =============================================================================

#[test]
fn test_repeated_sections_fold_scalars_and_accumulate_lists() {
    let dir = tempfile::tempdir().unwrap();
    let doc = "---\ntitle: Repeat\n---\n\
        ## 游戏信息\n- 开发者：First\n\
        ## 游戏截图\n![a](1.png)\n\
        ## 游戏信息\n- 开发者：Second\n\
        ## 游戏截图\n![b](2.png)\n";
    let record = normalize_file(&write_doc(&dir, "repeat.md", doc));

    assert_eq!(record.info.developer.as_deref(), Some("Second"));
    assert_eq!(record.screenshots, vec!["1.png", "2.png"]);
}

// =============================================================================
// Series inference
// =============================================================================

#[test]
fn test_nekopara_volume_inferred_from_title() {
    let dir = tempfile::tempdir().unwrap();
    let record = normalize_file(&write_doc(
        &dir,
        "nekopara3.md",
        "---\ntitle: Nekopara Vol.3\n---\n## 游戏名称\n- 英文：NEKOPARA Vol. 3\n",
    ));

    assert_eq!(record.id, "nekopara-vol-3");
    assert_eq!(record.series_name.as_deref(), Some("Nekopara"));
    assert_eq!(record.series_tag.as_deref(), Some("Vol. 3"));
}

#[test]
fn test_title_without_series_leaves_fields_unset() {
    let dir = tempfile::tempdir().unwrap();
    let record = normalize_file(&write_doc(&dir, "sp.md", "---\ntitle: Summer Pockets\n---\n"));
    assert_eq!(record.series_name, None);
    assert_eq!(record.series_tag, None);
}

// =============================================================================
// Document-level failures
// =============================================================================

#[test]
fn test_malformed_front_matter_yields_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let record = normalize_file(&write_doc(
        &dir,
        "Broken File.md",
        "---\ntitle: [oops\n---\n## 游戏简介\nx\n",
    ));

    assert!(record.parse_error);
    assert_eq!(record.id, "broken-file-md");
    assert_eq!(record.title, "Error Parsing: Broken File.md");
    assert!(record
        .parse_warning
        .as_deref()
        .unwrap()
        .starts_with("File-level parsing exception"));
}

#[test]
fn test_missing_file_yields_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let record = normalize_file(&dir.path().join("gone.md"));
    assert!(record.parse_error);
    assert_eq!(record.source_filename, "gone.md");
}
