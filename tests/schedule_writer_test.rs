// ==========================================
// 周排程仓储集成测试
// ==========================================
// 测试目标: 验证事务替换语义与核心不变式
// ==========================================

mod test_helpers;

use chrono::Duration;
use pm_weekly_aps::domain::types::{PmCategory, ScheduleStatus};
use pm_weekly_aps::logging;
use pm_weekly_aps::repository::{RepositoryError, ScheduleRepository};

#[tokio::test]
async fn test_replace_week_preserves_completed() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = test_helpers::open_shared_connection(&db_path).unwrap();
    let week = test_helpers::test_monday();

    for no in ["EQ-A", "EQ-B", "EQ-C"] {
        let mut eq = test_helpers::make_equipment(no);
        eq.monthly_pm = true;
        test_helpers::insert_equipment(conn.clone(), &eq).unwrap();
    }

    let repo = ScheduleRepository::from_connection(conn.clone());

    // 初始: 一条 Completed + 两条 Scheduled
    repo.replace_week(
        week,
        &[
            test_helpers::make_entry(
                week,
                "EQ-A",
                PmCategory::Monthly,
                "Alice",
                week,
                ScheduleStatus::Completed,
            ),
            test_helpers::make_entry(
                week,
                "EQ-B",
                PmCategory::Monthly,
                "Bob",
                week,
                ScheduleStatus::Scheduled,
            ),
            test_helpers::make_entry(
                week,
                "EQ-C",
                PmCategory::Monthly,
                "Alice",
                week + Duration::days(1),
                ScheduleStatus::Scheduled,
            ),
        ],
    )
    .unwrap();

    // 再生成: 只有 EQ-C 一条新 Scheduled
    let created = repo
        .replace_week(
            week,
            &[test_helpers::make_entry(
                week,
                "EQ-C",
                PmCategory::Monthly,
                "Bob",
                week,
                ScheduleStatus::Scheduled,
            )],
        )
        .unwrap();
    assert_eq!(created, 1);

    let entries = repo.find_by_week(week).unwrap();
    assert_eq!(entries.len(), 2);

    // Completed 保留,旧 Scheduled(EQ-B)被删除
    let completed: Vec<_> = entries
        .iter()
        .filter(|e| e.status == ScheduleStatus::Completed)
        .collect();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].equipment_no, "EQ-A");
    assert!(!entries.iter().any(|e| e.equipment_no == "EQ-B"));
}

#[tokio::test]
async fn test_replace_week_rolls_back_on_constraint_violation() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = test_helpers::open_shared_connection(&db_path).unwrap();
    let week = test_helpers::test_monday();

    let mut eq = test_helpers::make_equipment("EQ-A");
    eq.monthly_pm = true;
    test_helpers::insert_equipment(conn.clone(), &eq).unwrap();

    let repo = ScheduleRepository::from_connection(conn.clone());

    repo.replace_week(
        week,
        &[test_helpers::make_entry(
            week,
            "EQ-A",
            PmCategory::Monthly,
            "Alice",
            week,
            ScheduleStatus::Scheduled,
        )],
    )
    .unwrap();

    // 新批次内含重复 (设备, 类别) 对 → 部分唯一索引拒绝,整体回滚
    let result = repo.replace_week(
        week,
        &[
            test_helpers::make_entry(
                week,
                "EQ-A",
                PmCategory::Monthly,
                "Alice",
                week,
                ScheduleStatus::Scheduled,
            ),
            test_helpers::make_entry(
                week,
                "EQ-A",
                PmCategory::Monthly,
                "Bob",
                week + Duration::days(1),
                ScheduleStatus::Scheduled,
            ),
        ],
    );
    assert!(result.is_err());

    // 回滚后原条目完好,不可见部分写入
    let entries = repo.find_by_week(week).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].assigned_technician, "Alice");
}

#[tokio::test]
async fn test_replace_week_rejects_foreign_week_entries() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = test_helpers::open_shared_connection(&db_path).unwrap();
    let week = test_helpers::test_monday();

    let repo = ScheduleRepository::from_connection(conn);

    let err = repo
        .replace_week(
            week,
            &[test_helpers::make_entry(
                week + Duration::days(7),
                "EQ-A",
                PmCategory::Monthly,
                "Alice",
                week + Duration::days(7),
                ScheduleStatus::Scheduled,
            )],
        )
        .unwrap_err();

    assert!(matches!(err, RepositoryError::ValidationError(_)));
}

#[tokio::test]
async fn test_find_pending_on_or_after_filters_stale() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = test_helpers::open_shared_connection(&db_path).unwrap();
    let week = test_helpers::test_monday();

    for no in ["EQ-OLD", "EQ-NEW"] {
        let mut eq = test_helpers::make_equipment(no);
        eq.monthly_pm = true;
        test_helpers::insert_equipment(conn.clone(), &eq).unwrap();
    }

    let repo = ScheduleRepository::from_connection(conn);

    // 8 周前的陈旧 Scheduled 与上周的新 Scheduled
    let stale_week = week - Duration::days(56);
    repo.replace_week(
        stale_week,
        &[test_helpers::make_entry(
            stale_week,
            "EQ-OLD",
            PmCategory::Monthly,
            "Alice",
            stale_week,
            ScheduleStatus::Scheduled,
        )],
    )
    .unwrap();
    let prior_week = week - Duration::days(7);
    repo.replace_week(
        prior_week,
        &[test_helpers::make_entry(
            prior_week,
            "EQ-NEW",
            PmCategory::Monthly,
            "Alice",
            prior_week,
            ScheduleStatus::Scheduled,
        )],
    )
    .unwrap();

    // 宽限窗口 14 天: 只有上周条目仍阻塞
    let pending = repo
        .find_pending_on_or_after(week - Duration::days(14))
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].equipment_no, "EQ-NEW");
}
