//! Synthetic disc image builder
//!
//! Produces hybrid images: an ISO9660 volume descriptor set at sector 16 and
//! a UDF volume (anchor at 256, one type 1 partition starting at 257) that
//! share file data blocks where they can.

#![allow(dead_code)]

use crate::common::MemoryBlockDevice;
use std::collections::HashMap;
use udf::utils::checksum::{descriptor_crc, tag_checksum};

pub const BLOCK: usize = 2048;
pub const PVD_BLOCK: u32 = 16;
pub const MAIN_VDS: u32 = 32;
pub const RESERVE_VDS: u32 = 48;
pub const ANCHOR: u32 = 256;
pub const PARTITION_START: u32 = 257;

const VDS_BLOCKS: u32 = 16;
const POINTER_TARGET: u32 = 40;

/// How a file's data is recorded in the UDF view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileLayout {
    /// One extent
    Contiguous,
    /// Data inside the file entry
    Embedded,
    /// Extents of `fragment_blocks` blocks with a one block gap between them
    Fragmented { fragment_blocks: u32 },
    /// All-zero blocks become unallocated extents
    Sparse,
}

enum Kind {
    Dir { children: Vec<usize> },
    File { content: Vec<u8>, layout: FileLayout },
}

struct Node {
    name: String,
    path: String,
    parent: usize,
    deleted: bool,
    kind: Kind,
}

#[derive(Debug, Clone, Copy)]
struct Run {
    recorded: bool,
    block: u32,
    length: u32,
}

#[derive(Default)]
struct Allocation {
    fe_block: u32,
    runs: Vec<Run>,
    aed_block: Option<u32>,
    iso_extent: (u32, u32),
}

struct Allocator {
    next: u32,
}

impl Allocator {
    fn take(&mut self, count: u32) -> u32 {
        let start = self.next;
        self.next += count;
        start
    }
}

/// Where the builder put an entry
#[derive(Debug, Clone)]
pub struct Placement {
    /// First data block in the preferred view (UDF if present)
    pub start_block: u32,
    /// Size in bytes
    pub length: u64,
    /// Physical block of the UDF file entry
    pub entry_block: Option<u32>,
    /// ISO9660 extent
    pub iso_block: Option<u32>,
    /// UDF extents: physical block, length, recorded
    pub extents: Vec<(u32, u32, bool)>,
}

/// Built image plus the placement of every entry
pub struct Image {
    pub device: MemoryBlockDevice,
    placements: HashMap<String, Placement>,
}

impl Image {
    pub fn placement(&self, path: &str) -> &Placement {
        self.placements
            .get(path)
            .unwrap_or_else(|| panic!("no placement for {}", path))
    }

    pub fn block_mut(&mut self, block: u32) -> &mut [u8] {
        let offset = block as usize * BLOCK;
        &mut self.device.data[offset..offset + BLOCK]
    }

    /// Read `length` bytes straight from the image
    pub fn read(&self, start_block: u32, length: u64) -> Vec<u8> {
        let offset = start_block as usize * BLOCK;
        self.device.data[offset..offset + length as usize].to_vec()
    }

    pub fn into_device(self) -> MemoryBlockDevice {
        self.device
    }
}

pub struct ImageBuilder {
    nodes: Vec<Node>,
    udf: bool,
    iso: bool,
    extended_entries: bool,
    long_ads: bool,
    unicode_names: bool,
    max_inline_ads: Option<usize>,
    vds_pointer: bool,
    stale_partition: bool,
    foreign_partition: bool,
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: String::new(),
                path: String::from("/"),
                parent: 0,
                deleted: false,
                kind: Kind::Dir { children: Vec::new() },
            }],
            udf: true,
            iso: true,
            extended_entries: false,
            long_ads: false,
            unicode_names: false,
            max_inline_ads: None,
            vds_pointer: false,
            stale_partition: false,
            foreign_partition: false,
        }
    }

    pub fn udf(mut self, enabled: bool) -> Self {
        self.udf = enabled;
        self
    }

    pub fn iso(mut self, enabled: bool) -> Self {
        self.iso = enabled;
        self
    }

    /// Record Extended File Entries instead of File Entries
    pub fn extended_entries(mut self, enabled: bool) -> Self {
        self.extended_entries = enabled;
        self
    }

    /// Use long allocation descriptors instead of short ones
    pub fn long_ads(mut self, enabled: bool) -> Self {
        self.long_ads = enabled;
        self
    }

    /// Record UDF names as 16-bit CS0
    pub fn unicode_names(mut self, enabled: bool) -> Self {
        self.unicode_names = enabled;
        self
    }

    /// Move descriptors beyond the first `count` into an allocation extent
    pub fn max_inline_ads(mut self, count: usize) -> Self {
        self.max_inline_ads = Some(count);
        self
    }

    /// Split the main volume descriptor sequence with a pointer descriptor
    pub fn vds_pointer(mut self, enabled: bool) -> Self {
        self.vds_pointer = enabled;
        self
    }

    /// Add a superseded partition descriptor after the prevailing one
    pub fn stale_partition_descriptor(mut self, enabled: bool) -> Self {
        self.stale_partition = enabled;
        self
    }

    /// Follow the logical volume with a newer descriptor for partition number 1
    pub fn foreign_partition_descriptor(mut self, enabled: bool) -> Self {
        self.foreign_partition = enabled;
        self
    }

    pub fn dir(mut self, path: &str) -> Self {
        self.ensure_dir(path);
        self
    }

    pub fn file(self, path: &str, content: &[u8]) -> Self {
        self.file_with_layout(path, content, FileLayout::Contiguous)
    }

    pub fn file_with_layout(mut self, path: &str, content: &[u8], layout: FileLayout) -> Self {
        self.add_node(
            path,
            Kind::File {
                content: content.to_vec(),
                layout,
            },
            false,
        );
        self
    }

    /// File whose UDF identifier is marked deleted (absent from ISO9660)
    pub fn deleted_file(mut self, path: &str, content: &[u8]) -> Self {
        self.add_node(
            path,
            Kind::File {
                content: content.to_vec(),
                layout: FileLayout::Contiguous,
            },
            true,
        );
        self
    }

    fn ensure_dir(&mut self, path: &str) -> usize {
        let mut current = 0;
        for component in path.split('/').filter(|c| !c.is_empty()) {
            let existing = self.children(current).iter().copied().find(|&child| {
                let node = &self.nodes[child];
                node.name == component && !node.deleted && matches!(node.kind, Kind::Dir { .. })
            });
            current = match existing {
                Some(child) => child,
                None => {
                    let parent_path = &self.nodes[current].path;
                    let child_path = if parent_path == "/" {
                        format!("/{}", component)
                    } else {
                        format!("{}/{}", parent_path, component)
                    };
                    self.push_node(
                        current,
                        component,
                        child_path,
                        Kind::Dir { children: Vec::new() },
                        false,
                    )
                }
            };
        }
        current
    }

    fn add_node(&mut self, path: &str, kind: Kind, deleted: bool) {
        let (parent_path, name) = path.rsplit_once('/').expect("absolute path");
        let parent = self.ensure_dir(parent_path);
        self.push_node(parent, name, path.to_string(), kind, deleted);
    }

    fn push_node(&mut self, parent: usize, name: &str, path: String, kind: Kind, deleted: bool) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            name: name.to_string(),
            path,
            parent,
            deleted,
            kind,
        });
        if let Kind::Dir { children } = &mut self.nodes[parent].kind {
            children.push(index);
        }
        index
    }

    fn children(&self, index: usize) -> &[usize] {
        match &self.nodes[index].kind {
            Kind::Dir { children } => children,
            Kind::File { .. } => &[],
        }
    }

    fn cs0(&self, name: &str) -> Vec<u8> {
        if self.unicode_names {
            let mut out = vec![16];
            for unit in name.encode_utf16() {
                out.extend_from_slice(&unit.to_be_bytes());
            }
            out
        } else {
            let mut out = vec![8];
            out.extend(name.chars().map(|c| c as u32 as u8));
            out
        }
    }

    fn udf_directory_length(&self, index: usize) -> u32 {
        let parent = fid_length(0);
        let children: usize = self
            .children(index)
            .iter()
            .map(|&child| fid_length(self.cs0(&self.nodes[child].name).len()))
            .sum();
        (parent + children) as u32
    }

    fn iso_directory(&self, index: usize, allocation: &[Allocation]) -> Vec<u8> {
        let own = allocation[index].iso_extent;
        let parent = allocation[self.nodes[index].parent].iso_extent;

        let mut records = vec![
            iso_record(own.0, own.1, 0x02, &[0]),
            iso_record(parent.0, parent.1, 0x02, &[1]),
        ];
        for &child in self.children(index) {
            let node = &self.nodes[child];
            if node.deleted {
                continue;
            }
            let extent = allocation[child].iso_extent;
            match node.kind {
                Kind::Dir { .. } => records.push(iso_record(extent.0, extent.1, 0x02, node.name.as_bytes())),
                Kind::File { .. } => {
                    let id = format!("{};1", node.name);
                    records.push(iso_record(extent.0, extent.1, 0x00, id.as_bytes()));
                }
            }
        }

        let mut stream = Vec::new();
        for record in records {
            let in_sector = stream.len() % BLOCK;
            if in_sector + record.len() > BLOCK {
                stream.resize(stream.len() + BLOCK - in_sector, 0);
            }
            stream.extend_from_slice(&record);
        }
        stream.resize(blocks_for(stream.len() as u64).max(1) as usize * BLOCK, 0);
        stream
    }

    fn allocate(&self) -> (Vec<Allocation>, u32) {
        let mut allocation: Vec<Allocation> = (0..self.nodes.len()).map(|_| Allocation::default()).collect();
        let mut blocks = Allocator {
            next: PARTITION_START + 1,
        };

        if self.udf {
            for entry in allocation.iter_mut() {
                entry.fe_block = blocks.take(1);
            }

            for (index, node) in self.nodes.iter().enumerate() {
                let runs = match &node.kind {
                    Kind::File { content, layout } => file_runs(content, *layout, &mut blocks),
                    Kind::Dir { .. } => {
                        let length = self.udf_directory_length(index);
                        let block = blocks.take(blocks_for(length as u64));
                        vec![Run {
                            recorded: true,
                            block,
                            length,
                        }]
                    }
                };
                if let Some(max) = self.max_inline_ads {
                    if runs.len() > max {
                        allocation[index].aed_block = Some(blocks.take(1));
                    }
                }
                allocation[index].runs = runs;
            }
        }

        if self.iso {
            for (index, node) in self.nodes.iter().enumerate() {
                if let Kind::File { content, layout } = &node.kind {
                    if node.deleted {
                        continue;
                    }
                    let length = content.len() as u32;
                    let shared = self.udf && *layout == FileLayout::Contiguous;
                    allocation[index].iso_extent = match allocation[index].runs.first() {
                        Some(run) if shared => (run.block, length),
                        _ if length == 0 => (0, 0),
                        _ => (blocks.take(blocks_for(length as u64)), length),
                    };
                }
            }
            for (index, node) in self.nodes.iter().enumerate() {
                if let Kind::Dir { .. } = node.kind {
                    let size = self.iso_directory(index, &allocation).len() as u32;
                    allocation[index].iso_extent = (blocks.take(size / BLOCK as u32), size);
                }
            }
        }

        let total = blocks.next + 1;
        (allocation, total)
    }

    pub fn build(self) -> Image {
        let (allocation, total) = self.allocate();
        let mut data = vec![0u8; total as usize * BLOCK];

        if self.iso {
            self.write_iso(&mut data, &allocation, total);
        }
        let vrs_start = if self.iso { PVD_BLOCK + 2 } else { PVD_BLOCK };
        if self.udf {
            for (i, id) in [b"BEA01", b"NSR02", b"TEA01"].iter().enumerate() {
                let block = block_mut(&mut data, vrs_start + i as u32);
                block[1..6].copy_from_slice(*id);
                block[6] = 1;
            }
            self.write_udf(&mut data, &allocation, total);
        }

        let mut placements = HashMap::new();
        for (index, node) in self.nodes.iter().enumerate() {
            let entry = &allocation[index];
            let length = match &node.kind {
                Kind::File { content, .. } => content.len() as u64,
                Kind::Dir { .. } if self.udf => self.udf_directory_length(index) as u64,
                Kind::Dir { .. } => entry.iso_extent.1 as u64,
            };
            let embedded = matches!(node.kind, Kind::File { layout: FileLayout::Embedded, .. });
            let start_block = if self.udf {
                match entry.runs.iter().find(|run| run.recorded) {
                    Some(run) if !embedded => run.block,
                    _ => entry.fe_block,
                }
            } else {
                entry.iso_extent.0
            };

            placements.insert(
                node.path.clone(),
                Placement {
                    start_block,
                    length,
                    entry_block: self.udf.then_some(entry.fe_block),
                    iso_block: (self.iso && !node.deleted).then_some(entry.iso_extent.0),
                    extents: entry
                        .runs
                        .iter()
                        .map(|run| (run.block, run.length, run.recorded))
                        .collect(),
                },
            );
        }

        Image {
            device: MemoryBlockDevice::new(data),
            placements,
        }
    }

    fn write_iso(&self, data: &mut [u8], allocation: &[Allocation], total: u32) {
        let root = allocation[0].iso_extent;

        let pvd = block_mut(data, PVD_BLOCK);
        pvd[0] = 1;
        pvd[1..6].copy_from_slice(b"CD001");
        pvd[6] = 1;
        pvd[8..19].copy_from_slice(b"TEST SYSTEM");
        pvd[40..51].copy_from_slice(b"TEST VOLUME");
        put_both_u32(pvd, 80, total);
        put_both_u16(pvd, 128, BLOCK as u16);
        let record = iso_record(root.0, root.1, 0x02, &[0]);
        pvd[156..156 + record.len()].copy_from_slice(&record);

        let terminator = block_mut(data, PVD_BLOCK + 1);
        terminator[0] = 255;
        terminator[1..6].copy_from_slice(b"CD001");
        terminator[6] = 1;

        for (index, node) in self.nodes.iter().enumerate() {
            let extent = allocation[index].iso_extent;
            match &node.kind {
                Kind::Dir { .. } => {
                    let stream = self.iso_directory(index, allocation);
                    let offset = extent.0 as usize * BLOCK;
                    data[offset..offset + stream.len()].copy_from_slice(&stream);
                }
                Kind::File { content, .. } if !node.deleted && !content.is_empty() => {
                    let offset = extent.0 as usize * BLOCK;
                    data[offset..offset + content.len()].copy_from_slice(content);
                }
                Kind::File { .. } => {}
            }
        }
    }

    fn write_udf(&self, data: &mut [u8], allocation: &[Allocation], total: u32) {
        let partition_length = total - PARTITION_START;

        self.write_vds(data, MAIN_VDS, partition_length, self.vds_pointer, self.stale_partition);
        self.write_vds(data, RESERVE_VDS, partition_length, false, false);

        let anchor = block_mut(data, ANCHOR);
        put_u32(anchor, 16, VDS_BLOCKS * BLOCK as u32);
        put_u32(anchor, 20, MAIN_VDS);
        put_u32(anchor, 24, VDS_BLOCKS * BLOCK as u32);
        put_u32(anchor, 28, RESERVE_VDS);
        write_tag(anchor, 2, ANCHOR, 496);

        let fsd = block_mut(data, PARTITION_START);
        put_u16(fsd, 16, 3);
        put_u16(fsd, 18, 3);
        put_u32(fsd, 400, BLOCK as u32);
        put_u32(fsd, 404, allocation[0].fe_block - PARTITION_START);
        put_u16(fsd, 408, 0);
        write_tag(fsd, 256, 0, 496);

        for (index, node) in self.nodes.iter().enumerate() {
            let entry = &allocation[index];
            match &node.kind {
                Kind::Dir { .. } => {
                    let run = entry.runs[0];
                    let stream = self.udf_directory(index, allocation, run.block - PARTITION_START);
                    let offset = run.block as usize * BLOCK;
                    data[offset..offset + stream.len()].copy_from_slice(&stream);
                    self.write_file_entry(data, entry, 4, stream.len() as u64, None);
                }
                Kind::File { content, layout } => {
                    let mut position = 0usize;
                    for run in &entry.runs {
                        let end = position + run.length as usize;
                        if run.recorded {
                            let offset = run.block as usize * BLOCK;
                            data[offset..offset + run.length as usize].copy_from_slice(&content[position..end]);
                        }
                        position = end;
                    }
                    let embedded = (*layout == FileLayout::Embedded).then_some(content.as_slice());
                    self.write_file_entry(data, entry, 5, content.len() as u64, embedded);
                }
            }
        }
    }

    fn write_vds(&self, data: &mut [u8], start: u32, partition_length: u32, pointer: bool, stale: bool) {
        let mut block = start;

        write_partition_descriptor(block_mut(data, block), block, 1, 0, PARTITION_START, partition_length);
        block += 1;

        if pointer {
            let vdp = block_mut(data, block);
            put_u32(vdp, 16, 2);
            put_u32(vdp, 20, 4 * BLOCK as u32);
            put_u32(vdp, 24, POINTER_TARGET);
            write_tag(vdp, 3, block, 496);
            block = POINTER_TARGET;
        }

        let lvd = block_mut(data, block);
        put_u32(lvd, 16, 3);
        lvd[84] = 8;
        lvd[85..89].copy_from_slice(b"TEST");
        put_u32(lvd, 212, BLOCK as u32);
        lvd[217..236].copy_from_slice(b"*OSTA UDF Compliant");
        put_u32(lvd, 248, BLOCK as u32);
        put_u32(lvd, 252, 0);
        put_u16(lvd, 256, 0);
        put_u32(lvd, 264, 6);
        put_u32(lvd, 268, 1);
        lvd[440] = 1;
        lvd[441] = 6;
        put_u16(lvd, 442, 1);
        put_u16(lvd, 444, 0);
        write_tag(lvd, 6, block, 440 + 6 - 16);
        block += 1;

        if stale {
            write_partition_descriptor(block_mut(data, block), block, 0, 0, 0x4000, 1);
            block += 1;
        }
        if self.foreign_partition {
            write_partition_descriptor(block_mut(data, block), block, 5, 1, 0x4000, 1);
            block += 1;
        }

        write_tag(block_mut(data, block), 8, block, 496);
    }

    fn udf_directory(&self, index: usize, allocation: &[Allocation], location: u32) -> Vec<u8> {
        let parent = &allocation[self.nodes[index].parent];
        let mut stream = encode_fid(0x0A, parent.fe_block - PARTITION_START, &[], location);

        for &child in self.children(index) {
            let node = &self.nodes[child];
            let mut characteristics = 0;
            if matches!(node.kind, Kind::Dir { .. }) {
                characteristics |= 0x02;
            }
            if node.deleted {
                characteristics |= 0x04;
            }
            let icb = allocation[child].fe_block - PARTITION_START;
            stream.extend(encode_fid(characteristics, icb, &self.cs0(&node.name), location));
        }
        stream
    }

    fn write_file_entry(
        &self,
        data: &mut [u8],
        entry: &Allocation,
        file_type: u8,
        information_length: u64,
        embedded: Option<&[u8]>,
    ) {
        let lbn = entry.fe_block - PARTITION_START;
        let mut ads: Vec<Vec<u8>> = entry
            .runs
            .iter()
            .map(|run| {
                let (kind, location) = if run.recorded {
                    (0, run.block - PARTITION_START)
                } else {
                    (2, 0)
                };
                encode_ad(self.long_ads, kind, run.length, location)
            })
            .collect();

        if let Some(aed_block) = entry.aed_block {
            let split = self.max_inline_ads.unwrap_or(ads.len());
            let spilled: Vec<u8> = ads.split_off(split).concat();
            let aed_lbn = aed_block - PARTITION_START;
            ads.push(encode_ad(self.long_ads, 3, BLOCK as u32, aed_lbn));

            let aed = block_mut(data, aed_block);
            put_u32(aed, 20, spilled.len() as u32);
            aed[24..24 + spilled.len()].copy_from_slice(&spilled);
            write_tag(aed, 258, aed_lbn, 8 + spilled.len());
        }

        let (area, form) = match embedded {
            Some(content) => (content.to_vec(), 3),
            None => (ads.concat(), if self.long_ads { 1 } else { 0 }),
        };
        let recorded_blocks: u64 = entry
            .runs
            .iter()
            .filter(|run| run.recorded)
            .map(|run| blocks_for(run.length as u64) as u64)
            .sum();

        let fe = block_mut(data, entry.fe_block);
        put_u16(fe, 20, 4);
        put_u16(fe, 24, 1);
        fe[27] = file_type;
        put_u16(fe, 34, form);
        put_u16(fe, 48, 1);
        put_u64(fe, 56, information_length);

        let (identifier, base) = if self.extended_entries {
            put_u64(fe, 64, information_length);
            put_u64(fe, 72, recorded_blocks);
            put_u32(fe, 208, 0);
            put_u32(fe, 212, area.len() as u32);
            (266, 216)
        } else {
            put_u64(fe, 64, recorded_blocks);
            put_u32(fe, 168, 0);
            put_u32(fe, 172, area.len() as u32);
            (261, 176)
        };
        fe[base..base + area.len()].copy_from_slice(&area);
        write_tag(fe, identifier, lbn, base + area.len() - 16);
    }
}

fn file_runs(content: &[u8], layout: FileLayout, blocks: &mut Allocator) -> Vec<Run> {
    let length = content.len() as u64;
    match layout {
        FileLayout::Embedded => Vec::new(),
        FileLayout::Contiguous if length == 0 => Vec::new(),
        FileLayout::Contiguous => vec![Run {
            recorded: true,
            block: blocks.take(blocks_for(length)),
            length: length as u32,
        }],
        FileLayout::Fragmented { fragment_blocks } => content
            .chunks(fragment_blocks as usize * BLOCK)
            .map(|chunk| {
                let block = blocks.take(blocks_for(chunk.len() as u64));
                blocks.take(1);
                Run {
                    recorded: true,
                    block,
                    length: chunk.len() as u32,
                }
            })
            .collect(),
        FileLayout::Sparse => {
            let mut runs: Vec<Run> = Vec::new();
            for chunk in content.chunks(BLOCK) {
                let recorded = chunk.iter().any(|&b| b != 0);
                match runs.last_mut() {
                    Some(run) if run.recorded == recorded => run.length += chunk.len() as u32,
                    _ => runs.push(Run {
                        recorded,
                        block: 0,
                        length: chunk.len() as u32,
                    }),
                }
            }
            for run in runs.iter_mut().filter(|run| run.recorded) {
                run.block = blocks.take(blocks_for(run.length as u64));
            }
            runs
        }
    }
}

fn write_partition_descriptor(pd: &mut [u8], location: u32, sequence: u32, number: u16, start: u32, length: u32) {
    put_u32(pd, 16, sequence);
    put_u16(pd, 20, 1);
    put_u16(pd, 22, number);
    pd[25..31].copy_from_slice(b"+NSR02");
    put_u32(pd, 184, 1);
    put_u32(pd, 188, start);
    put_u32(pd, 192, length);
    write_tag(pd, 5, location, 496);
}

fn fid_length(identifier_length: usize) -> usize {
    (38 + identifier_length + 3) & !3
}

fn encode_fid(characteristics: u8, icb_lbn: u32, identifier: &[u8], location: u32) -> Vec<u8> {
    let length = fid_length(identifier.len());
    let mut fid = vec![0u8; length];
    put_u16(&mut fid, 16, 1);
    fid[18] = characteristics;
    fid[19] = identifier.len() as u8;
    put_u32(&mut fid, 20, BLOCK as u32);
    put_u32(&mut fid, 24, icb_lbn);
    put_u16(&mut fid, 28, 0);
    put_u16(&mut fid, 36, 0);
    fid[38..38 + identifier.len()].copy_from_slice(identifier);
    write_tag(&mut fid, 257, location, length - 16);
    fid
}

fn encode_ad(long: bool, kind: u32, length: u32, lbn: u32) -> Vec<u8> {
    let mut ad = vec![0u8; if long { 16 } else { 8 }];
    put_u32(&mut ad, 0, (kind << 30) | length);
    put_u32(&mut ad, 4, lbn);
    if long {
        put_u16(&mut ad, 8, 0);
    }
    ad
}

fn iso_record(extent: u32, length: u32, flags: u8, identifier: &[u8]) -> Vec<u8> {
    let mut record_length = 33 + identifier.len();
    if record_length % 2 != 0 {
        record_length += 1;
    }
    let mut record = vec![0u8; record_length];
    record[0] = record_length as u8;
    put_both_u32(&mut record, 2, extent);
    put_both_u32(&mut record, 10, length);
    record[25] = flags;
    put_both_u16(&mut record, 28, 1);
    record[32] = identifier.len() as u8;
    record[33..33 + identifier.len()].copy_from_slice(identifier);
    record
}

/// Fill in a descriptor tag over an already written descriptor body
pub fn write_tag(descriptor: &mut [u8], identifier: u16, location: u32, crc_length: usize) {
    put_u16(descriptor, 0, identifier);
    put_u16(descriptor, 2, 2);
    descriptor[5] = 0;
    put_u16(descriptor, 6, 1);
    let crc = descriptor_crc(&descriptor[16..16 + crc_length]);
    put_u16(descriptor, 8, crc);
    put_u16(descriptor, 10, crc_length as u16);
    put_u32(descriptor, 12, location);
    descriptor[4] = tag_checksum(&descriptor[..16]);
}

/// Recompute the tag of a descriptor edited in place
pub fn resign_tag(descriptor: &mut [u8]) {
    let identifier = u16::from_le_bytes([descriptor[0], descriptor[1]]);
    let crc_length = u16::from_le_bytes([descriptor[10], descriptor[11]]) as usize;
    let location = u32::from_le_bytes([descriptor[12], descriptor[13], descriptor[14], descriptor[15]]);
    write_tag(descriptor, identifier, location, crc_length);
}

pub fn blocks_for(length: u64) -> u32 {
    length.div_ceil(BLOCK as u64) as u32
}

fn block_mut(data: &mut [u8], block: u32) -> &mut [u8] {
    let offset = block as usize * BLOCK;
    &mut data[offset..offset + BLOCK]
}

fn put_u16(dst: &mut [u8], offset: usize, value: u16) {
    dst[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(dst: &mut [u8], offset: usize, value: u32) {
    dst[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_u64(dst: &mut [u8], offset: usize, value: u64) {
    dst[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

fn put_both_u16(dst: &mut [u8], offset: usize, value: u16) {
    dst[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    dst[offset + 2..offset + 4].copy_from_slice(&value.to_be_bytes());
}

fn put_both_u32(dst: &mut [u8], offset: usize, value: u32) {
    dst[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    dst[offset + 4..offset + 8].copy_from_slice(&value.to_be_bytes());
}
