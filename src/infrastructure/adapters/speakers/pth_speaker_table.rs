//! PTH Speaker Table - 读取 torch.save 保存的说话人表
//!
//! speakers.pth 是 zip 归档，其中 `<archive>/data.pkl` 为 pickle 序列化的字典，
//! 顶层键即说话人 ID。张量存储不需要读取。

use candle_core::pickle::{Object, Stack};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Range;
use std::path::Path;

use crate::application::ports::{SpeakerTableError, SpeakerTablePort};

const PICKLE_ENTRY_SUFFIX: &str = "data.pkl";

/// pickle 指令：SETITEMS / DICT
const OP_SETITEMS: u8 = b'u';
const OP_DICT: u8 = b'd';

#[derive(Debug, Clone, Default)]
pub struct PthSpeakerTable;

impl PthSpeakerTable {
    pub fn new() -> Self {
        Self
    }

    fn read_keys(path: &Path) -> Result<Vec<String>, SpeakerTableError> {
        let file = File::open(path).map_err(|e| SpeakerTableError::IoError(e.to_string()))?;
        let mut archive = zip::ZipArchive::new(BufReader::new(file))
            .map_err(|e| SpeakerTableError::InvalidArchive(e.to_string()))?;

        let entry_name = archive
            .file_names()
            .find(|name| name.ends_with(PICKLE_ENTRY_SUFFIX))
            .map(str::to_string)
            .ok_or_else(|| {
                SpeakerTableError::InvalidArchive(format!("no {} entry", PICKLE_ENTRY_SUFFIX))
            })?;

        let entry = archive
            .by_name(&entry_name)
            .map_err(|e| SpeakerTableError::InvalidArchive(e.to_string()))?;

        let (object, batches) = unpickle(&mut BufReader::new(entry))?;
        dict_keys(object, &batches)
    }
}

/// 逐条执行 pickle 指令，记录顶层字典每次批量插入的下标范围
///
/// candle 的 SETITEMS 与 DICT 会把一批键值对逆序追加，
/// 单条 SETITEM 保持顺序。
fn unpickle<R: BufRead>(
    reader: &mut R,
) -> Result<(Object, Vec<Range<usize>>), SpeakerTableError> {
    let mut stack = Stack::empty();
    let mut batches = Vec::new();

    loop {
        let opcode = reader
            .fill_buf()
            .map_err(|e| SpeakerTableError::IoError(e.to_string()))?
            .first()
            .copied();
        let before = top_level_len(&stack);

        let stopped = stack
            .read(reader)
            .map_err(|e| SpeakerTableError::UnpickleError(e.to_string()))?;

        if matches!(opcode, Some(OP_SETITEMS) | Some(OP_DICT)) {
            if let Some(after) = top_level_len(&stack) {
                let start = before.unwrap_or(0);
                if after > start + 1 {
                    batches.push(start..after);
                }
            }
        }
        if stopped {
            break;
        }
    }

    let object = stack
        .finalize()
        .map_err(|e| SpeakerTableError::UnpickleError(e.to_string()))?;
    Ok((object, batches))
}

/// 栈底为字典时返回其长度
fn top_level_len(stack: &Stack) -> Option<usize> {
    match stack.stack().first() {
        Some(Object::Dict(entries)) => Some(entries.len()),
        _ => None,
    }
}

/// 取顶层字典的字符串键，按 pickle 中出现的顺序
fn dict_keys(
    object: Object,
    batches: &[Range<usize>],
) -> Result<Vec<String>, SpeakerTableError> {
    let mut entries = match object {
        Object::Dict(entries) => entries,
        other => {
            return Err(SpeakerTableError::UnexpectedLayout(format!(
                "top level is not a dict: {:?}",
                other
            )))
        }
    };

    for batch in batches {
        if batch.end <= entries.len() {
            entries[batch.clone()].reverse();
        }
    }

    entries
        .into_iter()
        .map(|(key, _)| match key {
            Object::Unicode(id) => Ok(id),
            other => Err(SpeakerTableError::UnexpectedLayout(format!(
                "non-string speaker key: {:?}",
                other
            ))),
        })
        .collect()
}

impl SpeakerTablePort for PthSpeakerTable {
    fn speaker_ids(&self, path: &Path) -> Result<Vec<String>, SpeakerTableError> {
        let ids = Self::read_keys(path)?;
        tracing::debug!(path = %path.display(), count = ids.len(), "Speaker table loaded");
        Ok(ids)
    }
}

/// 测试夹具：写入只含键的 speakers.pth
#[cfg(test)]
pub(crate) mod fixtures {
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;
    use zip::write::SimpleFileOptions;

    /// protocol 2，与 `pickle.dumps({k0: 0, k1: 1, ...}, protocol=2)` 的输出一致
    pub fn pickle_dict(keys: &[&str]) -> Vec<u8> {
        let mut out = vec![0x80, 0x02, b'}', b'q', 0, b'('];
        for (i, key) in keys.iter().enumerate() {
            out.push(b'X');
            out.extend_from_slice(&(key.len() as u32).to_le_bytes());
            out.extend_from_slice(key.as_bytes());
            out.extend_from_slice(&[b'q', (i + 1) as u8, b'K', i as u8]);
        }
        out.extend_from_slice(b"u.");
        out
    }

    pub fn write_archive(path: &Path, entry: &str, payload: &[u8]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        writer.start_file(entry, options).unwrap();
        writer.write_all(payload).unwrap();
        writer.finish().unwrap();
    }

    pub fn write_speakers_pth(path: &Path, keys: &[&str]) {
        write_archive(path, "speakers/data.pkl", &pickle_dict(keys));
    }
}
