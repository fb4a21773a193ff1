/// 军番发放结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCode {
    /// 命令中输入的姓名
    pub name: String,
    /// 名册中的行号（1 起始）
    pub row: usize,
    /// 新军番
    pub code: String,
    /// 被替换的旧军番（重新发放时）
    pub previous: Option<String>,
}

impl IssuedCode {
    pub fn is_reissue(&self) -> bool {
        self.previous.is_some()
    }
}
