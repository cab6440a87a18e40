// ==========================================
// 设备预防性维护周排程引擎 - 年度到期日分散器
// ==========================================
// 目的: 同一周完成的年度保养若都在 365 天后到期,
//       次年同一周会形成负载尖峰;按设备固定偏移打散
// 红线: 纯函数 —— 同一设备编号的偏移跨运行恒定
// ==========================================

use chrono::{Duration, NaiveDate};

/// 偏移取值区间: [-30, +30] 天(模 61)
const SPREAD_MODULUS: i64 = 61;
const SPREAD_SHIFT: i64 = 30;

// ==========================================
// AnnualSpreader - 年度到期日分散器
// ==========================================
pub struct AnnualSpreader;

impl AnnualSpreader {
    /// 计算下次年度到期日期
    ///
    /// # 规则
    /// - completion_date + 365 天 + offset_days(equipment_no)
    pub fn next_annual_due(equipment_no: &str, completion_date: NaiveDate) -> NaiveDate {
        completion_date + Duration::days(365) + Duration::days(Self::offset_days(equipment_no))
    }

    /// 设备固定偏移天数,取值 [-30, +30]
    ///
    /// # 规则
    /// - 编号含数字: 取末段连续数字 模 61 再减 30
    /// - 编号无数字: FNV-1a 64 位散列 模 61 再减 30
    ///   (散列跨平台、跨运行稳定)
    pub fn offset_days(equipment_no: &str) -> i64 {
        let residue = match Self::trailing_number_mod(equipment_no, SPREAD_MODULUS as u64) {
            Some(r) => r as i64,
            None => (Self::fnv1a64(equipment_no) % SPREAD_MODULUS as u64) as i64,
        };
        residue - SPREAD_SHIFT
    }

    /// 末段连续数字串对 modulus 取模(逐位累积,长数字串不溢出)
    fn trailing_number_mod(s: &str, modulus: u64) -> Option<u64> {
        let mut current: Option<u64> = None;
        let mut last: Option<u64> = None;

        for ch in s.chars() {
            if let Some(digit) = ch.to_digit(10) {
                let acc = current.unwrap_or(0);
                current = Some((acc * 10 + digit as u64) % modulus);
            } else if current.is_some() {
                last = current.take();
            }
        }

        current.or(last)
    }

    /// FNV-1a 64 位散列
    fn fnv1a64(s: &str) -> u64 {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

        let mut hash = FNV_OFFSET;
        for byte in s.as_bytes() {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_offset_within_range() {
        for no in [
            "EQ-0001", "EQ-0042", "PUMP-7", "A220-1234567890123456789012345", "VALVE", "压缩机-88",
        ] {
            let offset = AnnualSpreader::offset_days(no);
            assert!((-30..=30).contains(&offset), "{} -> {}", no, offset);
        }
    }

    #[test]
    fn test_offset_is_stable() {
        // 同一编号重复计算结果恒定
        for _ in 0..10 {
            assert_eq!(
                AnnualSpreader::offset_days("EQ-0042"),
                AnnualSpreader::offset_days("EQ-0042")
            );
        }
    }

    #[test]
    fn test_trailing_digits_rule() {
        // 末段数字 42 → 42 % 61 - 30 = 12
        assert_eq!(AnnualSpreader::offset_days("EQ-0042"), 12);
        // 多段数字取末段: "A220-3" → 3 % 61 - 30 = -27
        assert_eq!(AnnualSpreader::offset_days("A220-3"), -27);
    }

    #[test]
    fn test_next_annual_due_pure() {
        let completion = d(2025, 3, 10);

        let due1 = AnnualSpreader::next_annual_due("EQ-0042", completion);
        let due2 = AnnualSpreader::next_annual_due("EQ-0042", completion);
        assert_eq!(due1, due2);

        // 偏移 12 天: 2025-03-10 + 365 + 12
        assert_eq!(due1, d(2026, 3, 22));
    }

    #[test]
    fn test_no_digit_fallback_stable() {
        let offset = AnnualSpreader::offset_days("VALVE");
        assert!((-30..=30).contains(&offset));
        assert_eq!(offset, AnnualSpreader::offset_days("VALVE"));
    }
}
