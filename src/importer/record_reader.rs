// ==========================================
// 业务管理系统导入引擎 - 分隔文本读取器
// ==========================================
// 职责: CSV 文本 → 表头 + 原始行记录
// 处理: 空行丢弃 / 重复表头过滤 / 噪声行过滤
// 说明: 导出工具会把多批次结果拼接,中间夹带重复表头
// ==========================================

use crate::domain::record::RawRecord;
use crate::importer::error::ImporterResult;
use crate::importer::patterns;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const UTF8_BOM: char = '\u{feff}';

// ==========================================
// HeaderFilter - 重复表头识别策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderFilter {
    /// 首字段不是 UUID 即视为重复表头（主键非 UUID 的表会误删）
    #[default]
    UuidFirstField,
    /// 仅丢弃与表头完全一致的行（大小写不敏感）
    ExactHeaderMatch,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderOptions {
    pub header_filter: HeaderFilter,
    /// 纯数字字段也可证明该行是数据（多表导出路径）
    pub accept_digit_marker: bool,
}

impl ReaderOptions {
    pub fn single_table() -> Self {
        Self::default()
    }

    pub fn multi_table() -> Self {
        Self {
            accept_digit_marker: true,
            ..Self::default()
        }
    }

    pub fn with_header_filter(mut self, filter: HeaderFilter) -> Self {
        self.header_filter = filter;
        self
    }
}

// ==========================================
// ParsedSource - 读取结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ParsedSource {
    pub header: Vec<String>,
    pub records: Vec<RawRecord>,
    pub dropped_headers: usize, // 被识别为重复表头的行
    pub dropped_noise: usize,   // 无任何可识别值的行
}

impl ParsedSource {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ==========================================
// DelimitedRecordReader - 读取器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct DelimitedRecordReader {
    options: ReaderOptions,
}

impl DelimitedRecordReader {
    pub fn new(options: ReaderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ReaderOptions {
        self.options
    }

    /// 读取文件（非 UTF-8 字节按替换字符处理）
    pub fn read_path(&self, path: &Path) -> ImporterResult<ParsedSource> {
        let bytes = fs::read(path)?;
        let contents = match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %path.display(), "源文件不是合法 UTF-8,已按替换字符读取");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        self.read(&contents)
    }

    /// 解析 CSV 文本
    ///
    /// # 规则
    /// 1. 按行切分后逐行分词,引号不跨行（未闭合的引号只影响本行）
    /// 2. 第一条非空行恒为表头
    /// 3. 后续行按 HeaderFilter 过滤重复表头
    /// 4. 至少一个字段是 UUID / 日期前缀（/ 纯数字）才保留
    pub fn read(&self, contents: &str) -> ImporterResult<ParsedSource> {
        let mut parsed = ParsedSource::default();
        let mut header_seen = false;

        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let line_number = idx + 1;

            let record = tokenize_line(line)?;
            if is_blank(&record) {
                continue;
            }

            if !header_seen {
                parsed.header = header_from(&record);
                header_seen = true;
                continue;
            }

            if self.is_repeated_header(&record, &parsed.header) {
                debug!(line = line_number, "丢弃重复表头行");
                parsed.dropped_headers += 1;
                continue;
            }

            if !self.has_data_marker(&record) {
                debug!(line = line_number, "丢弃噪声行");
                parsed.dropped_noise += 1;
                continue;
            }

            let fields = parsed
                .header
                .iter()
                .zip(record.iter())
                .map(|(name, value)| (name.clone(), value.to_string()))
                .collect();
            parsed.records.push(RawRecord::new(line_number, fields));
        }

        Ok(parsed)
    }

    fn is_repeated_header(&self, record: &StringRecord, header: &[String]) -> bool {
        match self.options.header_filter {
            HeaderFilter::UuidFirstField => {
                !record.get(0).map(patterns::is_uuid).unwrap_or(false)
            }
            HeaderFilter::ExactHeaderMatch => {
                record.len() == header.len()
                    && record
                        .iter()
                        .zip(header)
                        .all(|(field, name)| field.eq_ignore_ascii_case(name))
            }
        }
    }

    fn has_data_marker(&self, record: &StringRecord) -> bool {
        record.iter().any(|field| {
            patterns::is_uuid(field)
                || patterns::has_date_prefix(field)
                || (self.options.accept_digit_marker && patterns::is_digits(field))
        })
    }
}

// 单行分词: 每行独立的 csv 读取器,未闭合引号读到行尾为止
fn tokenize_line(line: &str) -> ImporterResult<StringRecord> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(line.as_bytes());

    let mut record = StringRecord::new();
    reader.read_record(&mut record)?;
    Ok(record)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.is_empty())
}

fn header_from(record: &StringRecord) -> Vec<String> {
    record
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            if idx == 0 {
                name.trim_start_matches(UTF8_BOM).trim().to_string()
            } else {
                name.to_string()
            }
        })
        .collect()
}
