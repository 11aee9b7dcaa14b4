//! Transaction executor
//!
//! Every CRUD operation runs as a closure under exactly one transaction:
//! IMMEDIATE for writes, deferred for reads. The closure's error return
//! drops the transaction, which rolls back; the deadline is re-checked
//! after the closure so an expired context rolls back rather than
//! committing late. Tuple returns cover the paired-result cases (such as
//! an envelope plus a count) without a second entry point.

use crate::ctx::CallContext;
use crate::Result;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Run `work` under a read-write transaction; commit only on Ok
pub fn write_tx<T>(
    conn: &mut Connection,
    ctx: &CallContext,
    work: impl FnOnce(&Transaction) -> Result<T>,
) -> Result<T> {
    ctx.check()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let out = work(&tx)?;
    ctx.check()?;
    tx.commit()?;
    Ok(out)
}

/// Run `work` under a read-only (deferred) transaction so multi-statement
/// reads observe one snapshot
pub fn read_tx<T>(
    conn: &Connection,
    ctx: &CallContext,
    work: impl FnOnce(&Transaction) -> Result<T>,
) -> Result<T> {
    ctx.check()?;
    let tx = conn.unchecked_transaction()?;
    let out = work(&tx)?;
    ctx.check()?;
    tx.commit()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::time::{Duration, Instant};

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE t (v INTEGER)", []).unwrap();
        conn
    }

    #[test]
    fn test_commit_on_ok() {
        let mut conn = test_conn();
        let ctx = CallContext::background();
        write_tx(&mut conn, &ctx, |tx| {
            tx.execute("INSERT INTO t (v) VALUES (1)", [])?;
            Ok(())
        })
        .unwrap();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0)).unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn test_rollback_on_err() {
        let mut conn = test_conn();
        let ctx = CallContext::background();
        let result: Result<()> = write_tx(&mut conn, &ctx, |tx| {
            tx.execute("INSERT INTO t (v) VALUES (1)", [])?;
            Err(Error::InvalidArgument("boom".to_string()))
        });
        assert!(result.is_err());
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0)).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_expired_deadline_rolls_back() {
        let mut conn = test_conn();
        // Valid when the transaction opens, expired before commit.
        let ctx = CallContext::with_deadline(Instant::now() + Duration::from_millis(5));
        let result: Result<()> = write_tx(&mut conn, &ctx, |tx| {
            tx.execute("INSERT INTO t (v) VALUES (1)", [])?;
            std::thread::sleep(Duration::from_millis(20));
            Ok(())
        });
        assert!(matches!(result, Err(Error::DeadlineExceeded)));
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0)).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_paired_result() {
        let mut conn = test_conn();
        let ctx = CallContext::background();
        let (a, b) = write_tx(&mut conn, &ctx, |tx| {
            tx.execute("INSERT INTO t (v) VALUES (7)", [])?;
            let n: i64 = tx.query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0))?;
            Ok((7i64, n))
        })
        .unwrap();
        assert_eq!((a, b), (7, 1));
    }
}
