//! Typed sample rows produced from profiler records.
//!
//! Each struct holds one CSV line after casting and derivation. Unit
//! conversions are applied once while mapping, so the stored values are the
//! ones charted (kilobytes rather than bytes or pages).

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use chrono::NaiveDateTime;

use super::constants::KB;
use super::schema::{RowFields, CGROUP_SCHEMA, PROCESS_SCHEMA};
use crate::analyze::{finite_or_zero, identity_key, safe_div, IoSizeBin};
use crate::error::ParseError;

/// Categorical value used to group rows, e.g. a CPU id or a process state.
///
/// Integers sort numerically and before text so CPU tracks come out in
/// natural order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    Int(i64),
    Text(String),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Int(v) => write!(f, "{v}"),
            GroupKey::Text(s) => f.write_str(s),
        }
    }
}

/// One process sample.
///
/// # Fields
/// - `rss`: resident set size in pages, as reported
/// - `rss_kb`: `rss * pagesize / 1024`
/// - `vsize`, `rchar`, `rbytes`, `wchar`, `wbytes`: kilobytes
/// - `syscr`, `syscw`: cumulative read/write syscall counts
/// - `rsize`, `wsize`: average bytes per read/write syscall, 0 without calls
/// - `uname`: hex-encoded `pid:desc:ppid`, an opaque grouping key
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessSample {
    pub timestamp: NaiveDateTime,
    pub desc: String,
    pub pid: i32,
    pub state: String,
    pub ppid: i32,
    pub nthrds: i32,
    pub rss: i64,
    pub pagesize: i64,
    pub rss_kb: f64,
    pub pss_kb: i64,
    pub vsize: f64,
    pub proc_id: i32,
    pub avg_cpu: f64,
    pub avg_usr: f64,
    pub avg_sys: f64,
    pub secs: i64,
    pub cputime: f64,
    pub usrtime: f64,
    pub systime: f64,
    pub rchar: f64,
    pub rbytes: f64,
    pub syscr: i64,
    pub rsize: f64,
    pub wchar: f64,
    pub wbytes: f64,
    pub syscw: i64,
    pub wsize: f64,
    pub rsize_bin: IoSizeBin,
    pub wsize_bin: IoSizeBin,
    pub uname: String,
}

impl ProcessSample {
    /// Cast one process line and derive the secondary columns.
    ///
    /// `line` is the 1-based position within the process group, used only
    /// for error reporting.
    pub fn from_line(text: &str, line: usize) -> Result<Self, ParseError> {
        let row = RowFields::split(text, &PROCESS_SCHEMA, line)?;

        let desc = row.text(1);
        let pid = row.int(2)?;
        let ppid = row.int(4)?;
        let rss = row.int64(6)?;
        let pagesize = row.int64(7)?;
        // Columns 8 (rss_kb), 22 (rsize) and 26 (wsize) must still cast but are
        // recomputed below from the raw counters.
        row.int64(8)?;
        row.float(22)?;
        row.float(26)?;

        let rbytes = row.int64(20)?;
        let syscr = row.int64(21)?;
        let wbytes = row.int64(24)?;
        let syscw = row.int64(25)?;

        let rsize = safe_div(rbytes as f64, syscr as f64);
        let wsize = safe_div(wbytes as f64, syscw as f64);

        Ok(Self {
            timestamp: row.timestamp(0)?,
            uname: identity_key(pid, &desc, ppid),
            desc,
            pid,
            state: row.text(3),
            ppid,
            nthrds: row.int(5)?,
            rss,
            pagesize,
            rss_kb: finite_or_zero(rss as f64 * pagesize as f64 / KB),
            pss_kb: row.int64(9)?,
            vsize: safe_div(row.float(10)?, KB),
            proc_id: row.int(11)?,
            avg_cpu: finite_or_zero(row.float(12)?),
            avg_usr: finite_or_zero(row.float(13)?),
            avg_sys: finite_or_zero(row.float(14)?),
            secs: row.int64(15)?,
            cputime: finite_or_zero(row.float(16)?),
            usrtime: finite_or_zero(row.float(17)?),
            systime: finite_or_zero(row.float(18)?),
            rchar: safe_div(row.int64(19)? as f64, KB),
            rbytes: safe_div(rbytes as f64, KB),
            syscr,
            rsize,
            wchar: safe_div(row.int64(23)? as f64, KB),
            wbytes: safe_div(wbytes as f64, KB),
            syscw,
            wsize,
            rsize_bin: IoSizeBin::classify(rsize),
            wsize_bin: IoSizeBin::classify(wsize),
        })
    }

    /// Numeric value of `field`, or `None` for categorical fields.
    pub fn value(&self, field: ProcessField) -> Option<f64> {
        use ProcessField::*;
        let v = match field {
            Pid => self.pid as f64,
            Ppid => self.ppid as f64,
            Nthrds => self.nthrds as f64,
            Rss => self.rss as f64,
            Pagesize => self.pagesize as f64,
            RssKb => self.rss_kb,
            PssKb => self.pss_kb as f64,
            Vsize => self.vsize,
            Proc => self.proc_id as f64,
            AvgCpu => self.avg_cpu,
            AvgUsr => self.avg_usr,
            AvgSys => self.avg_sys,
            Secs => self.secs as f64,
            Cputime => self.cputime,
            Usrtime => self.usrtime,
            Systime => self.systime,
            Rchar => self.rchar,
            Rbytes => self.rbytes,
            Syscr => self.syscr as f64,
            Rsize => self.rsize,
            Wchar => self.wchar,
            Wbytes => self.wbytes,
            Syscw => self.syscw as f64,
            Wsize => self.wsize,
            Desc | State | RsizeBin | WsizeBin | Uname => return None,
        };
        Some(v)
    }

    /// Grouping key for `field`.
    pub fn key(&self, field: ProcessField) -> GroupKey {
        use ProcessField::*;
        match field {
            Pid => GroupKey::Int(self.pid.into()),
            Ppid => GroupKey::Int(self.ppid.into()),
            Nthrds => GroupKey::Int(self.nthrds.into()),
            Proc => GroupKey::Int(self.proc_id.into()),
            Rss => GroupKey::Int(self.rss),
            Pagesize => GroupKey::Int(self.pagesize),
            PssKb => GroupKey::Int(self.pss_kb),
            Secs => GroupKey::Int(self.secs),
            Syscr => GroupKey::Int(self.syscr),
            Syscw => GroupKey::Int(self.syscw),
            Desc => GroupKey::Text(self.desc.clone()),
            State => GroupKey::Text(self.state.clone()),
            Uname => GroupKey::Text(self.uname.clone()),
            RsizeBin => GroupKey::Text(self.rsize_bin.label().to_string()),
            WsizeBin => GroupKey::Text(self.wsize_bin.label().to_string()),
            other => GroupKey::Text(self.value(other).unwrap_or_default().to_string()),
        }
    }
}

/// Column selector for [`ProcessSample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessField {
    Desc,
    Pid,
    State,
    Ppid,
    Nthrds,
    Rss,
    Pagesize,
    RssKb,
    PssKb,
    Vsize,
    Proc,
    AvgCpu,
    AvgUsr,
    AvgSys,
    Secs,
    Cputime,
    Usrtime,
    Systime,
    Rchar,
    Rbytes,
    Syscr,
    Rsize,
    Wchar,
    Wbytes,
    Syscw,
    Wsize,
    RsizeBin,
    WsizeBin,
    Uname,
}

impl ProcessField {
    pub const ALL: [ProcessField; 29] = [
        Self::Desc,
        Self::Pid,
        Self::State,
        Self::Ppid,
        Self::Nthrds,
        Self::Rss,
        Self::Pagesize,
        Self::RssKb,
        Self::PssKb,
        Self::Vsize,
        Self::Proc,
        Self::AvgCpu,
        Self::AvgUsr,
        Self::AvgSys,
        Self::Secs,
        Self::Cputime,
        Self::Usrtime,
        Self::Systime,
        Self::Rchar,
        Self::Rbytes,
        Self::Syscr,
        Self::Rsize,
        Self::Wchar,
        Self::Wbytes,
        Self::Syscw,
        Self::Wsize,
        Self::RsizeBin,
        Self::WsizeBin,
        Self::Uname,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desc => "desc",
            Self::Pid => "pid",
            Self::State => "state",
            Self::Ppid => "ppid",
            Self::Nthrds => "nthrds",
            Self::Rss => "rss",
            Self::Pagesize => "pagesize",
            Self::RssKb => "rss_kb",
            Self::PssKb => "pss_kb",
            Self::Vsize => "vsize",
            Self::Proc => "proc",
            Self::AvgCpu => "avg_cpu",
            Self::AvgUsr => "avg_usr",
            Self::AvgSys => "avg_sys",
            Self::Secs => "secs",
            Self::Cputime => "cputime",
            Self::Usrtime => "usrtime",
            Self::Systime => "systime",
            Self::Rchar => "rchar",
            Self::Rbytes => "rbytes",
            Self::Syscr => "syscr",
            Self::Rsize => "rsize",
            Self::Wchar => "wchar",
            Self::Wbytes => "wbytes",
            Self::Syscw => "syscw",
            Self::Wsize => "wsize",
            Self::RsizeBin => "rsize_bin",
            Self::WsizeBin => "wsize_bin",
            Self::Uname => "uname",
        }
    }
}

impl fmt::Display for ProcessField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match Self::ALL.iter().find(|f| f.as_str() == s) {
            Some(field) => Ok(*field),
            None => bail!("Unknown process field: {s}"),
        }
    }
}

/// One cgroup sample. `cache`, `rss`, `tcache` and `trss` are kilobytes;
/// the remaining memory columns stay in bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct CgroupSample {
    pub timestamp: NaiveDateTime,
    pub desc: String,
    pub tgids: i32,
    pub pids: i32,
    pub cache: f64,
    pub rss: f64,
    pub mapped_file: i64,
    pub inactive_anon: i64,
    pub active_anon: i64,
    pub unevictable: i64,
    pub tcache: f64,
    pub trss: f64,
}

impl CgroupSample {
    pub fn from_line(text: &str, line: usize) -> Result<Self, ParseError> {
        let row = RowFields::split(text, &CGROUP_SCHEMA, line)?;
        Ok(Self {
            timestamp: row.timestamp(0)?,
            desc: row.text(1),
            tgids: row.int(2)?,
            pids: row.int(3)?,
            cache: safe_div(row.int64(4)? as f64, KB),
            rss: safe_div(row.int64(5)? as f64, KB),
            mapped_file: row.int64(6)?,
            inactive_anon: row.int64(7)?,
            active_anon: row.int64(8)?,
            unevictable: row.int64(9)?,
            tcache: safe_div(row.int64(10)? as f64, KB),
            trss: safe_div(row.int64(11)? as f64, KB),
        })
    }

    pub fn value(&self, field: CgroupField) -> Option<f64> {
        let v = match field {
            CgroupField::Desc => return None,
            CgroupField::Tgids => self.tgids as f64,
            CgroupField::Pids => self.pids as f64,
            CgroupField::Cache => self.cache,
            CgroupField::Rss => self.rss,
            CgroupField::MappedFile => self.mapped_file as f64,
            CgroupField::InactiveAnon => self.inactive_anon as f64,
            CgroupField::ActiveAnon => self.active_anon as f64,
            CgroupField::Unevictable => self.unevictable as f64,
            CgroupField::Tcache => self.tcache,
            CgroupField::Trss => self.trss,
        };
        Some(v)
    }

    pub fn key(&self, field: CgroupField) -> GroupKey {
        match field {
            CgroupField::Desc => GroupKey::Text(self.desc.clone()),
            CgroupField::Tgids => GroupKey::Int(self.tgids.into()),
            CgroupField::Pids => GroupKey::Int(self.pids.into()),
            other => GroupKey::Text(self.value(other).unwrap_or_default().to_string()),
        }
    }
}

/// Column selector for [`CgroupSample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CgroupField {
    Desc,
    Tgids,
    Pids,
    Cache,
    Rss,
    MappedFile,
    InactiveAnon,
    ActiveAnon,
    Unevictable,
    Tcache,
    Trss,
}

impl CgroupField {
    pub const ALL: [CgroupField; 11] = [
        Self::Desc,
        Self::Tgids,
        Self::Pids,
        Self::Cache,
        Self::Rss,
        Self::MappedFile,
        Self::InactiveAnon,
        Self::ActiveAnon,
        Self::Unevictable,
        Self::Tcache,
        Self::Trss,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desc => "desc",
            Self::Tgids => "tgids",
            Self::Pids => "pids",
            Self::Cache => "cache",
            Self::Rss => "rss",
            Self::MappedFile => "mapped_file",
            Self::InactiveAnon => "inactive_anon",
            Self::ActiveAnon => "active_anon",
            Self::Unevictable => "unevictable",
            Self::Tcache => "tcache",
            Self::Trss => "trss",
        }
    }
}

impl fmt::Display for CgroupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CgroupField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match Self::ALL.iter().find(|f| f.as_str() == s) {
            Some(field) => Ok(*field),
            None => bail!("Unknown cgroup field: {s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn process_line(
        ts: &str,
        pid: i32,
        state: &str,
        rss: i64,
        pagesize: i64,
        rbytes: i64,
        syscr: i64,
    ) -> String {
        format!(
            "{ts},/proc/{pid},{pid},{state},1,4,{rss},{pagesize},0,0,{vsize},2,\
             10.0,6.0,4.0,30,1.5,1.0,0.5,{rchar},{rbytes},{syscr},0,2048,1024,2,0",
            vsize = 4096 * 1024,
            rchar = 8192,
        )
    }

    #[test]
    fn test_process_from_line_derivations() {
        let line = process_line("2024/03/01T12:00:00", 42, "R", 300, 4096, 8192, 2);
        let s = ProcessSample::from_line(&line, 1).unwrap();

        assert_eq!(s.pid, 42);
        assert_eq!(s.state, "R");
        assert_eq!(s.proc_id, 2);
        assert_eq!(s.rss_kb, 300.0 * 4096.0 / 1024.0);
        assert_eq!(s.vsize, 4096.0);
        assert_eq!(s.rchar, 8.0);
        assert_eq!(s.rbytes, 8.0);
        assert_eq!(s.wchar, 2.0);
        assert_eq!(s.wbytes, 1.0);
        // rsize from raw bytes: 8192 / 2
        assert_eq!(s.rsize, 4096.0);
        assert_eq!(s.rsize_bin, IoSizeBin::K4);
        // wsize: 1024 / 2
        assert_eq!(s.wsize, 512.0);
        assert_eq!(s.wsize_bin, IoSizeBin::B512);
        assert_eq!(s.uname, identity_key(42, "/proc/42", 1));
    }

    #[test]
    fn test_zero_pagesize_gives_zero_rss_kb() {
        let line = process_line("2024/03/01T12:00:00", 1, "S", 300, 0, 0, 0);
        let s = ProcessSample::from_line(&line, 1).unwrap();
        assert_eq!(s.rss_kb, 0.0);
    }

    #[test]
    fn test_zero_syscalls_give_zero_size() {
        let line = process_line("2024/03/01T12:00:00", 1, "S", 1, 4096, 8192, 0);
        let s = ProcessSample::from_line(&line, 1).unwrap();
        assert_eq!(s.rsize, 0.0);
        assert_eq!(s.rsize_bin, IoSizeBin::Zero);
    }

    #[test]
    fn test_process_wrong_field_count() {
        let err = ProcessSample::from_line("2024/03/01T12:00:00,/proc/1,1", 3).unwrap_err();
        assert!(matches!(
            err,
            ParseError::FieldCount {
                line: 3,
                expected: 27,
                got: 3
            }
        ));
    }

    #[test]
    fn test_process_non_numeric_pid() {
        let line = process_line("2024/03/01T12:00:00", 1, "S", 1, 4096, 0, 0)
            .replacen(",1,S,", ",one,S,", 1);
        let err = ProcessSample::from_line(&line, 5).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidNumber {
                line: 5,
                column: "pid",
                ..
            }
        ));
    }

    #[test]
    fn test_process_value_and_key() {
        let line = process_line("2024/03/01T12:00:00", 9, "D", 1, 4096, 0, 0);
        let s = ProcessSample::from_line(&line, 1).unwrap();
        assert_eq!(s.value(ProcessField::AvgCpu), Some(10.0));
        assert_eq!(s.value(ProcessField::State), None);
        assert_eq!(s.key(ProcessField::Proc), GroupKey::Int(2));
        assert_eq!(s.key(ProcessField::State), GroupKey::Text("D".to_string()));
    }

    #[test]
    fn test_cgroup_from_line_converts_kb() {
        let line = "2024/03/01T12:00:00,/cgroup/job_1,2,5,2048,4096,100,200,300,400,8192,1024";
        let s = CgroupSample::from_line(line, 1).unwrap();
        assert_eq!(s.tgids, 2);
        assert_eq!(s.pids, 5);
        assert_eq!(s.cache, 2.0);
        assert_eq!(s.rss, 4.0);
        assert_eq!(s.mapped_file, 100);
        assert_eq!(s.tcache, 8.0);
        assert_eq!(s.trss, 1.0);
    }

    #[test]
    fn test_field_names_roundtrip() {
        for field in ProcessField::ALL {
            assert_eq!(field.as_str().parse::<ProcessField>().unwrap(), field);
        }
        for field in CgroupField::ALL {
            assert_eq!(field.as_str().parse::<CgroupField>().unwrap(), field);
        }
        assert!("bogus".parse::<ProcessField>().is_err());
    }

    #[test]
    fn test_group_key_ordering() {
        let mut keys = vec![
            GroupKey::Text("b".to_string()),
            GroupKey::Int(10),
            GroupKey::Int(2),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                GroupKey::Int(2),
                GroupKey::Int(10),
                GroupKey::Text("b".to_string())
            ]
        );
    }
}
