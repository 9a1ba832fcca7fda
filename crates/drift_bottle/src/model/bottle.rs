use native_db::*;
use native_model::{Model, native_model};
use serde::{Deserialize, Serialize};

/// 扔漂流瓶时提供的信息，id 与状态由存储层分配
#[derive(Debug, Clone, PartialEq)]
pub struct BottleDraft {
    pub content: String,
    pub sender_id: u64,
    pub sender_name: String,
    pub sender_group_id: u64,
    pub sender_group_name: String,
}

/// 捡起漂流瓶的人，记录下来用于追溯
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Picker {
    pub user_id: u64,
    pub group_id: u64,
}

/// `status` 索引的取值
pub const DRIFTING: u8 = 0;
pub const CLAIMED: u8 = 1;

pub mod v1 {
    use super::*;

    /// 捡瓶子时只需遍历 `status` 索引中仍在漂流的部分，不受已捡起的历史记录数量影响
    #[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
    #[native_model(id = 1, version = 1)]
    #[native_db(secondary_key(status -> u8))]
    pub struct Bottle {
        #[primary_key]
        pub id: u64,
        pub content: String,
        pub sender_id: u64,
        pub sender_name: String,
        pub sender_group_id: u64,
        pub sender_group_name: String,
        /// 被捡起后置为 true，之后不会再被随机选中
        pub claimed: bool,
        pub thrown_at: chrono::DateTime<chrono::Local>,
        pub picker_id: Option<u64>,
        pub picker_group_id: Option<u64>,
        pub picked_at: Option<chrono::DateTime<chrono::Local>>,
    }

    impl Bottle {
        pub fn new(id: u64, draft: BottleDraft) -> Self {
            Self {
                id,
                content: draft.content,
                sender_id: draft.sender_id,
                sender_name: draft.sender_name,
                sender_group_id: draft.sender_group_id,
                sender_group_name: draft.sender_group_name,
                claimed: false,
                thrown_at: chrono::Local::now(),
                picker_id: None,
                picker_group_id: None,
                picked_at: None,
            }
        }

        pub fn status(&self) -> u8 {
            if self.claimed { CLAIMED } else { DRIFTING }
        }

        pub fn claim(&self, picker: Picker) -> Self {
            Self {
                claimed: true,
                picker_id: Some(picker.user_id),
                picker_group_id: Some(picker.group_id),
                picked_at: Some(chrono::Local::now()),
                ..self.clone()
            }
        }
    }

    /// 具名的自增序列，保证漂流瓶 id 单调递增且不会复用
    #[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
    #[native_model(id = 2, version = 1)]
    #[native_db]
    pub struct Sequence {
        #[primary_key]
        pub name: String,
        pub value: u64,
    }
}
