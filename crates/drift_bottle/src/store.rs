use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use native_db::{Builder, Database, Models};
use rand::Rng;

use crate::model::bottle::{
    BottleDraft, DRIFTING, Picker,
    v1::{Bottle, BottleKey, Sequence},
};

static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models.define::<Bottle>().expect("invalid Bottle model");
    models.define::<Sequence>().expect("invalid Sequence model");
    models
});

const BOTTLE_SEQUENCE: &str = "bottle";

/// 漂流瓶的持久化存储
///
/// 每个操作都在单个读写事务内完成，底层引擎同一时刻只允许一个写事务，
/// 因此并发的捡瓶子不会拿到同一个漂流瓶，并发扔出的漂流瓶也不会丢失。
pub struct BottleStore {
    db: Database<'static>,
}

impl BottleStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new().create(&MODELS, path.as_ref())?;
        Ok(Self { db })
    }

    pub fn in_memory() -> Result<Self> {
        let db = Builder::new().create_in_memory(&MODELS)?;
        Ok(Self { db })
    }

    pub fn insert(&self, draft: BottleDraft) -> Result<u64> {
        let rw = self.db.rw_transaction()?;
        let id = match rw.get().primary::<Sequence>(BOTTLE_SEQUENCE)? {
            Some(sequence) => {
                let next = Sequence {
                    name: sequence.name.clone(),
                    value: sequence.value + 1,
                };
                rw.update(sequence, next.clone())?;
                next.value
            }
            None => {
                rw.insert(Sequence {
                    name: BOTTLE_SEQUENCE.to_owned(),
                    value: 1,
                })?;
                1
            }
        };
        rw.insert(Bottle::new(id, draft))?;
        rw.commit()?;
        Ok(id)
    }

    /// 随机选中一个未被捡起的漂流瓶并标记为已捡起，没有可捡的漂流瓶时返回 `None`
    pub fn claim_random(&self, picker: Picker) -> Result<Option<Bottle>> {
        let rw = self.db.rw_transaction()?;
        let mut unclaimed = {
            // 扫描结束前持有表的引用，必须先释放才能在同一事务中更新
            let scan = rw.scan().secondary::<Bottle>(BottleKey::status)?;
            scan.start_with(DRIFTING)?.collect::<Result<Vec<_>, _>>()?
        };
        if unclaimed.is_empty() {
            return Ok(None);
        }
        let bottle = unclaimed.swap_remove(rand::rng().random_range(0..unclaimed.len()));
        let claimed = bottle.claim(picker);
        rw.update(bottle, claimed.clone())?;
        rw.commit()?;
        Ok(Some(claimed))
    }

    pub fn unclaimed_count(&self) -> Result<usize> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().secondary::<Bottle>(BottleKey::status)?;
        let mut count = 0;
        for bottle in scan.start_with(DRIFTING)? {
            bottle?;
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc, thread};

    use super::*;

    fn draft(content: &str) -> BottleDraft {
        BottleDraft {
            content: content.to_owned(),
            sender_id: 114514,
            sender_name: "Alice".to_owned(),
            sender_group_id: 1919810,
            sender_group_name: "Room".to_owned(),
        }
    }

    const PICKER: Picker = Picker {
        user_id: 10001,
        group_id: 20002,
    };

    #[test]
    fn test_claim_empty_store() {
        let store = BottleStore::in_memory().unwrap();
        assert!(store.claim_random(PICKER).unwrap().is_none());
        assert_eq!(store.unclaimed_count().unwrap(), 0);
    }

    #[test]
    fn test_insert_and_claim() {
        let store = BottleStore::in_memory().unwrap();
        assert_eq!(store.insert(draft("first")).unwrap(), 1);
        assert_eq!(store.insert(draft("second")).unwrap(), 2);
        assert_eq!(store.unclaimed_count().unwrap(), 2);

        let bottle = store.claim_random(PICKER).unwrap().unwrap();
        assert!(bottle.claimed);
        assert_eq!(bottle.picker_id, Some(PICKER.user_id));
        assert_eq!(bottle.picker_group_id, Some(PICKER.group_id));
        assert!(bottle.picked_at.is_some());
        assert_eq!(bottle.sender_id, 114514);
        assert_eq!(bottle.sender_group_name, "Room");
        assert_eq!(store.unclaimed_count().unwrap(), 1);

        let other = store.claim_random(PICKER).unwrap().unwrap();
        assert_ne!(bottle.id, other.id);
        let contents = HashSet::from([bottle.content, other.content]);
        assert_eq!(contents, HashSet::from(["first".to_owned(), "second".to_owned()]));
        assert!(store.claim_random(PICKER).unwrap().is_none());
        // 已捡起的漂流瓶不影响 id 的分配
        assert_eq!(store.insert(draft("third")).unwrap(), 3);
    }

    #[test]
    fn test_selection_is_not_order_biased() {
        let store = BottleStore::in_memory().unwrap();
        let mut first_picks = HashSet::new();
        for _ in 0..50 {
            for content in ["a", "b", "c", "d"] {
                store.insert(draft(content)).unwrap();
            }
            first_picks.insert(store.claim_random(PICKER).unwrap().unwrap().content);
            while store.claim_random(PICKER).unwrap().is_some() {}
        }
        // 50 轮每轮都选中同一个的概率可以忽略
        assert!(first_picks.len() > 1);
    }

    #[test]
    fn test_claim_with_large_history() {
        const HISTORY: usize = 1000;
        let store = BottleStore::in_memory().unwrap();
        for i in 0..HISTORY {
            store.insert(draft(&format!("old-{i}"))).unwrap();
        }
        while store.claim_random(PICKER).unwrap().is_some() {}
        assert_eq!(store.unclaimed_count().unwrap(), 0);

        let fresh = ["new-a", "new-b"]
            .map(|content| store.insert(draft(content)).unwrap())
            .into_iter()
            .collect::<HashSet<_>>();
        assert_eq!(store.unclaimed_count().unwrap(), 2);
        // 索引中只剩下仍在漂流的瓶子，历史记录完整保留
        let r = store.db.r_transaction().unwrap();
        let drifting = r
            .scan()
            .secondary::<Bottle>(BottleKey::status)
            .unwrap()
            .start_with(DRIFTING)
            .unwrap()
            .map(|bottle| bottle.unwrap().id)
            .collect::<HashSet<_>>();
        assert_eq!(drifting, fresh);
        assert_eq!(r.len().primary::<Bottle>().unwrap(), HISTORY as u64 + 2);
        drop(r);

        let picked = [
            store.claim_random(PICKER).unwrap().unwrap(),
            store.claim_random(PICKER).unwrap().unwrap(),
        ];
        assert_eq!(picked.iter().map(|bottle| bottle.id).collect::<HashSet<_>>(), fresh);
        assert!(picked.iter().all(|bottle| bottle.content.starts_with("new-")));
        assert!(store.claim_random(PICKER).unwrap().is_none());
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bottles.native_db");
        {
            let store = BottleStore::open(&path).unwrap();
            store.insert(draft("persisted")).unwrap();
        }
        let store = BottleStore::open(&path).unwrap();
        let bottle = store.claim_random(PICKER).unwrap().unwrap();
        assert_eq!(bottle.content, "persisted");
        drop(store);

        let store = BottleStore::open(&path).unwrap();
        assert!(store.claim_random(PICKER).unwrap().is_none());
        assert_eq!(store.insert(draft("next")).unwrap(), 2);
    }

    #[test]
    fn test_concurrent_insert_then_claim() {
        const N: usize = 32;
        let store = Arc::new(BottleStore::in_memory().unwrap());
        let ids = thread::scope(|s| {
            let handles = (0..N)
                .map(|i| {
                    let store = store.clone();
                    s.spawn(move || store.insert(draft(&format!("bottle-{i}"))).unwrap())
                })
                .collect::<Vec<_>>();
            handles.into_iter().map(|h| h.join().unwrap()).collect::<HashSet<_>>()
        });
        assert_eq!(ids.len(), N);

        let claimed = thread::scope(|s| {
            let handles = (0..N)
                .map(|_| {
                    let store = store.clone();
                    s.spawn(move || store.claim_random(PICKER).unwrap())
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap().content)
                .collect::<Vec<_>>()
        });
        let unique = claimed.iter().cloned().collect::<HashSet<_>>();
        assert_eq!(claimed.len(), N);
        assert_eq!(unique, (0..N).map(|i| format!("bottle-{i}")).collect::<HashSet<_>>());
        assert!(store.claim_random(PICKER).unwrap().is_none());
    }
}
