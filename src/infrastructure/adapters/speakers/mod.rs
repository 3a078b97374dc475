//! Speaker Table Adapter - 说话人表读取实现

mod pth_speaker_table;

pub use pth_speaker_table::PthSpeakerTable;

#[cfg(test)]
pub(crate) use pth_speaker_table::fixtures;
