//! 重建順序排程

use gcbase_core::{GcError, TableDef};
use std::collections::{BTreeMap, HashSet};

/// 重建順序排程器
pub struct RebuildScheduler;

impl RebuildScheduler {
    /// 計算重建順序：每個資料表都排在它連結到的資料表之後
    ///
    /// 反覆掃描所有資料表，所有連結目標都已排入時才排入該表，
    /// 尚未符合條件的資料表留到下一輪。一整輪沒有任何進展即判定為循環連結；
    /// 連結到不存在的資料表則立即失敗。
    pub fn compute(tables: &BTreeMap<String, TableDef>) -> gcbase_core::Result<Vec<String>> {
        let mut order: Vec<String> = Vec::with_capacity(tables.len());
        let mut placed: HashSet<&str> = HashSet::with_capacity(tables.len());
        let mut pass = 0;

        while order.len() < tables.len() {
            pass += 1;
            let mut progressed = false;
            // 資料表 → 阻擋它的連結目標
            let mut blocked: BTreeMap<&str, &str> = BTreeMap::new();

            for (name, table) in tables {
                if placed.contains(name.as_str()) {
                    continue;
                }

                let mut blocker = None;
                for (_, link) in table.links() {
                    let target = link.table.as_str();
                    if !tables.contains_key(target) {
                        return Err(GcError::CyclicOrUnresolvedLink {
                            table: name.clone(),
                            target: target.to_string(),
                        });
                    }
                    if !placed.contains(target) {
                        blocker = Some(target);
                        break;
                    }
                }

                match blocker {
                    None => {
                        placed.insert(name.as_str());
                        order.push(name.clone());
                        progressed = true;
                    }
                    Some(target) => {
                        tracing::debug!("第 {} 輪: 資料表 {} 等待 {}", pass, name, target);
                        blocked.insert(name.as_str(), target);
                    }
                }
            }

            if !progressed {
                return Err(Self::cycle_error(&blocked));
            }
        }

        tracing::debug!("重建順序 ({} 輪): {:?}", pass, order);
        Ok(order)
    }

    /// 單一資料表的遞移連結目標，依重建順序排列，不含該表本身
    ///
    /// 只走訪 `name` 可達的子圖；其他資料表的循環或失效連結不影響結果。
    pub fn dependencies_of(
        tables: &BTreeMap<String, TableDef>,
        name: &str,
    ) -> gcbase_core::Result<Vec<String>> {
        let (root, _) = tables
            .get_key_value(name)
            .ok_or_else(|| GcError::MissingTable(name.to_string()))?;

        let mut order = Vec::new();
        let mut visiting = HashSet::new();
        let mut done = HashSet::new();
        Self::visit(tables, root, &mut visiting, &mut done, &mut order)?;

        // 最後一個是 name 本身
        order.pop();
        tracing::debug!("資料表 {} 的連結目標: {:?}", name, order);
        Ok(order)
    }

    /// 深度優先：先排入所有連結目標，再排入自己
    fn visit<'a>(
        tables: &'a BTreeMap<String, TableDef>,
        name: &'a str,
        visiting: &mut HashSet<&'a str>,
        done: &mut HashSet<&'a str>,
        order: &mut Vec<String>,
    ) -> gcbase_core::Result<()> {
        if done.contains(name) {
            return Ok(());
        }
        let Some(table) = tables.get(name) else {
            return Err(GcError::MissingTable(name.to_string()));
        };

        visiting.insert(name);
        for (_, link) in table.links() {
            let target = link.table.as_str();
            if done.contains(target) {
                continue;
            }
            if visiting.contains(target) || !tables.contains_key(target) {
                return Err(GcError::CyclicOrUnresolvedLink {
                    table: name.to_string(),
                    target: target.to_string(),
                });
            }
            Self::visit(tables, target, visiting, done, order)?;
        }
        visiting.remove(name);
        done.insert(name);
        order.push(name.to_string());
        Ok(())
    }

    /// 沿著阻擋關係走到重複出現的資料表，回報循環中的一條連結
    fn cycle_error(blocked: &BTreeMap<&str, &str>) -> GcError {
        let mut seen = HashSet::new();
        let mut current = blocked.keys().next().copied().unwrap_or_default();

        while seen.insert(current) {
            match blocked.get(current) {
                Some(&next) => current = next,
                None => break,
            }
        }

        let target = blocked.get(current).copied().unwrap_or(current);
        GcError::CyclicOrUnresolvedLink {
            table: current.to_string(),
            target: target.to_string(),
        }
    }
}
