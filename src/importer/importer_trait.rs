// ==========================================
// 业务管理系统导入引擎 - 导入组件 Trait
// ==========================================
// 职责: 定义可替换的导入组件接口（不包含实现）
// ==========================================

use crate::domain::record::ColumnClassification;
use crate::domain::types::ColumnKind;

// ==========================================
// ColumnClassifier Trait
// ==========================================
// 用途: 列名 → 语义类型
// 实现者: NamingConventionClassifier（命名约定）
// 说明: 后续可替换为真实 schema 查询,不影响转换与落库逻辑
pub trait ColumnClassifier: Send + Sync {
    /// 判定单列语义类型
    ///
    /// # 约束
    /// - 纯函数: 同名列结果恒定
    /// - 无错误: 任意列名都落入某一类型
    fn classify(&self, column_name: &str) -> ColumnKind;

    /// 按表头一次性分类（保持列顺序）
    fn classify_header(&self, header: &[String]) -> Vec<ColumnClassification> {
        header
            .iter()
            .map(|name| ColumnClassification::new(name.clone(), self.classify(name)))
            .collect()
    }
}
