// ==========================================
// 设备预防性维护周排程引擎 - 优先级清单导入
// ==========================================
// 来源: 外部维护的分档 CSV 文件(每档一个文件)
// 约定: 含 equipment_no 表头列;其余列忽略
// 语义: 档号越小优先级越高;同设备出现在多档时取最高档
// ==========================================

use crate::importer::error::ImportError;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

/// 解析单个分档 CSV,返回设备编号列表
///
/// # 参数
/// - path: CSV 文件路径
///
/// # 返回
/// - `Ok(Vec<String>)`: 去重后的设备编号(保持文件顺序)
pub fn parse_tier_csv(path: &Path) -> Result<Vec<String>, ImportError> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    if let Some(ext) = path.extension() {
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(
                ext.to_string_lossy().to_string(),
            ));
        }
    }

    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // 允许行长度不一致
        .from_reader(file);

    // 定位 equipment_no 列(表头大小写不敏感)
    let headers = reader.headers()?.clone();
    let col = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("equipment_no"))
        .ok_or_else(|| ImportError::MissingEquipmentColumn(path.display().to_string()))?;

    let mut seen = HashMap::new();
    let mut equipment_nos = Vec::new();
    for result in reader.records() {
        let record = result?;
        let raw = record.get(col).unwrap_or("").trim();
        if raw.is_empty() {
            continue;
        }
        if seen.insert(raw.to_string(), ()).is_none() {
            equipment_nos.push(raw.to_string());
        }
    }

    Ok(equipment_nos)
}

/// 加载多个分档文件,合并为 设备编号 -> 档号 映射
///
/// # 参数
/// - tier_files: (文件路径, 档号) 列表,档号从 1 起
///
/// # 说明
/// - 缺失的文件跳过并告警(分档文件为可选输入)
/// - 同设备出现在多档时保留最小档号(最高优先级)
pub fn load_priority_tiers<P>(tier_files: &[(P, u32)]) -> Result<HashMap<String, u32>, ImportError>
where
    P: AsRef<Path>,
{
    let mut tiers: HashMap<String, u32> = HashMap::new();

    for (path, tier) in tier_files {
        let path = path.as_ref();
        if *tier < 1 {
            return Err(ImportError::InvalidTier(*tier));
        }

        if !path.exists() {
            warn!(file = %path.display(), tier = tier, "优先级清单文件不存在,跳过");
            continue;
        }

        let equipment_nos = parse_tier_csv(path)?;
        info!(
            file = %path.display(),
            tier = tier,
            count = equipment_nos.len(),
            "优先级清单已加载"
        );

        for no in equipment_nos {
            tiers
                .entry(no)
                .and_modify(|t| *t = (*t).min(*tier))
                .or_insert(*tier);
        }
    }

    Ok(tiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_tier_csv() {
        let file = write_csv("equipment_no,description\nEQ-001,泵\nEQ-002,阀门\n EQ-001 ,重复\n\n");
        let nos = parse_tier_csv(file.path()).unwrap();
        assert_eq!(nos, vec!["EQ-001".to_string(), "EQ-002".to_string()]);
    }

    #[test]
    fn test_missing_column() {
        let file = write_csv("bfm,description\nEQ-001,泵\n");
        let err = parse_tier_csv(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::MissingEquipmentColumn(_)));
    }

    #[test]
    fn test_load_priority_tiers_merges_highest() {
        let p1 = write_csv("equipment_no\nEQ-001\n");
        let p2 = write_csv("equipment_no\nEQ-001\nEQ-002\n");

        let tiers = load_priority_tiers(&[(p2.path(), 2), (p1.path(), 1)]).unwrap();
        assert_eq!(tiers.get("EQ-001"), Some(&1)); // 多档取最高档
        assert_eq!(tiers.get("EQ-002"), Some(&2));
    }

    #[test]
    fn test_missing_file_skipped() {
        let tiers =
            load_priority_tiers(&[(Path::new("/nonexistent/pm_list_1.csv"), 1)]).unwrap();
        assert!(tiers.is_empty());
    }
}
