/// 抽签结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawResult {
    /// 实际抽取人数（临时名单模式下可能小于请求数）
    pub count: usize,
    /// 候选总数（去重后）
    pub total: usize,
    pub winners: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
    pub sides: u32,
    pub value: u32,
}

/// 支持的骰子
pub const DICE_SIDES: [u32; 3] = [6, 10, 100];
