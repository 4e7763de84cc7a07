//! Bank-description fixtures
//!
//! Builds SoundbanksInfo documents and placeholder source assets on disk.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileFixture {
    pub id: String,
    pub name: String,
    pub language: String,
}

impl FileFixture {
    pub fn new(id: &str, name: &str, language: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            language: language.to_string(),
        }
    }

    fn to_xml(&self) -> String {
        format!(
            r#"<File Id="{}" Language="{}"><ShortName>{}</ShortName></File>"#,
            self.id, self.language, self.name
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct BankFixture {
    pub id: String,
    pub name: String,
    pub language: String,
    pub events: Vec<(String, String)>,
    pub streamed: Vec<FileFixture>,
    pub resident: Vec<FileFixture>,
}

impl BankFixture {
    pub fn new(id: &str, name: &str, language: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            language: language.to_string(),
            ..Default::default()
        }
    }

    pub fn event(mut self, id: &str, name: &str) -> Self {
        self.events.push((id.to_string(), name.to_string()));
        self
    }

    pub fn streamed(mut self, id: &str, name: &str) -> Self {
        let language = self.language.clone();
        self.streamed.push(FileFixture::new(id, name, &language));
        self
    }

    pub fn resident(mut self, id: &str, name: &str) -> Self {
        let language = self.language.clone();
        self.resident.push(FileFixture::new(id, name, &language));
        self
    }

    pub fn to_xml(&self) -> String {
        let events: String = self
            .events
            .iter()
            .map(|(id, name)| format!(r#"<Event Id="{id}" Name="{name}"/>"#))
            .collect();
        let streamed: String = self.streamed.iter().map(FileFixture::to_xml).collect();
        let resident: String = self.resident.iter().map(FileFixture::to_xml).collect();

        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<SoundBanksInfo Platform="Windows">
  <SoundBanks>
    <SoundBank Id="{}" Language="{}">
      <ShortName>{}</ShortName>
      <IncludedEvents>{}</IncludedEvents>
      <ReferencedStreamedFiles>{}</ReferencedStreamedFiles>
      <IncludedMemoryFiles>{}</IncludedMemoryFiles>
    </SoundBank>
  </SoundBanks>
</SoundBanksInfo>
"#,
            self.id, self.language, self.name, events, streamed, resident
        )
    }
}

/// Write `<dir>/<bank name>.xml`, creating `dir`
pub fn write_bank_xml(dir: &Path, bank: &BankFixture) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("{}.xml", bank.name));
    std::fs::write(&path, bank.to_xml()).unwrap();
    path
}

/// Write a placeholder `<dir>/<id>.wem`
pub fn write_source(dir: &Path, id: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("{id}.wem"));
    std::fs::write(&path, b"RIFF....WAVE").unwrap();
    path
}
