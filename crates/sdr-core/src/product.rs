//! 產品識別鍵

use serde::{Deserialize, Serialize};
use std::fmt;

/// 產品複合鍵（料號、品名、包裝規格、標準單位）
///
/// 分組時視為單一不透明鍵。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductKey {
    /// 料號
    pub pt_code: String,

    /// 品名
    pub product_name: String,

    /// 包裝規格
    pub package_size: String,

    /// 標準單位
    pub standard_uom: String,
}

impl ProductKey {
    /// 創建新的產品鍵
    pub fn new(
        pt_code: impl Into<String>,
        product_name: impl Into<String>,
        package_size: impl Into<String>,
        standard_uom: impl Into<String>,
    ) -> Self {
        Self {
            pt_code: pt_code.into(),
            product_name: product_name.into(),
            package_size: package_size.into(),
            standard_uom: standard_uom.into(),
        }
    }

    /// 只有料號的產品鍵（其餘欄位留空）
    pub fn from_code(pt_code: impl Into<String>) -> Self {
        Self::new(pt_code, "", "", "")
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            self.pt_code, self.product_name, self.package_size, self.standard_uom
        )
    }
}
