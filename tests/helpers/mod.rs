//! Shared CrossWOZ fixtures for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use crosswoz_gallery::{DatasetBrowser, DatasetStore};

pub fn single_domain_example() -> Value {
    json!({
        "type": "单领域",
        "task description": ["你要去一个景点游玩", "你想知道门票"],
        "goal": [[1, "景点", "名称", "", false], [1, "景点", "门票", "", false]],
        "final_goal": [[1, "景点", "名称", "故宫", false], [1, "景点", "门票", "60元", false]],
        "messages": [
            {"role": "usr", "content": "推荐一个景点", "dialog_act": [["Request", "景点", "名称", ""]],
             "user_state": [[1, "景点", "名称", "", false], [1, "景点", "门票", "", false]]},
            {"role": "sys", "content": "推荐故宫", "dialog_act": [["Inform", "景点", "名称", "故宫"]],
             "sys_state": {"景点": {"名称": "故宫", "门票": "", "selectedResults": ["故宫"]}}},
            {"role": "usr", "content": "门票多少钱", "dialog_act": [["Request", "景点", "门票", ""]],
             "user_state": [[1, "景点", "名称", "故宫", true], [1, "景点", "门票", "", false]]},
            {"role": "sys", "content": "60元", "dialog_act": [["Inform", "景点", "门票", "60元"]],
             "sys_state": {"景点": {"名称": "故宫", "门票": "60元", "selectedResults": ["故宫"]}}}
        ]
    })
}

pub fn multi_domain_example() -> Value {
    json!({
        "type": "不独立多领域",
        "task description": ["找酒店", "再找餐馆"],
        "goal": [[1, "酒店", "名称", "", false]],
        "final_goal": [[1, "酒店", "名称", "如家", false]],
        "messages": [
            {"role": "usr", "content": "找个酒店", "dialog_act": [],
             "user_state": [[1, "酒店", "名称", "", false]]},
            {"role": "sys", "content": "如家", "dialog_act": [],
             "sys_state": {"酒店": {"名称": "如家"}}}
        ]
    })
}

pub fn hotel_db() -> Value {
    json!([
        ["如家", {"名称": "如家", "酒店类型": "经济型", "评分": 4.5}],
        ["汉庭", {"名称": "汉庭", "酒店类型": "经济型", "评分": 4.1}],
        ["北京饭店", {"名称": "北京饭店", "酒店类型": "豪华型", "评分": 4.8}]
    ])
}

fn write(dir: &Path, name: &str, value: &Value) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// A data directory with `train.json` (two examples), an empty `val.json`,
/// and `database/hotel_db.json` (three records). Other files are absent.
pub fn fixture_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "train.json",
        &json!({"1": single_domain_example(), "2": multi_domain_example()}),
    );
    write(dir.path(), "val.json", &json!({}));
    write(dir.path(), "database/hotel_db.json", &hotel_db());
    dir
}

pub fn browser(dir: &TempDir) -> DatasetBrowser {
    DatasetBrowser::new(Arc::new(DatasetStore::new(dir.path())))
}
