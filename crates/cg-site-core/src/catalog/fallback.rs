//! Built-in dataset shown when the backend is unreachable.

use cg_api_types::{CatalogItem, RecordId};

use super::Catalog;

const PLACEHOLDER: &str = "https://via.placeholder.com/300x200";

fn entry(id: i64, title: &str, category: &str, tag: &str, swatch: &str, label: &str, desc: &str) -> CatalogItem {
    CatalogItem {
        id: RecordId::Numeric(id),
        title: title.to_owned(),
        category: category.to_owned(),
        tag: tag.to_owned(),
        img: format!("{PLACEHOLDER}/{swatch}?text={label}"),
        desc: desc.to_owned(),
        price: None,
    }
}

pub fn fallback_catalog() -> Catalog {
    Catalog {
        products: vec![
            entry(1, "Tic Cat Toe ^4", "ue5 cpp", "UE5 / C++", "b829ea/fff", "Project+1", "A cyberpunk-themed tic-tac-toe game built with UE5 and C++"),
            entry(2, "Neural Networks Visualizer", "ai python", "AI / Python", "00f0ff/000", "Project+2", "Interactive visualization of neural network training processes"),
            entry(3, "Procedural World Generator", "ue5 cpp", "UE5 / C++", "b829ea/fff", "Project+3", "Infinite procedurally generated cyberpunk worlds"),
            entry(4, "AI Chat System", "ai python", "AI / Python", "00f0ff/000", "Project+4", "Machine learning-powered conversational AI"),
            entry(5, "Physics Engine", "cpp", "C++", "fcee0a/000", "Project+5", "High-performance physics simulation engine"),
            entry(6, "Game Optimization Tool", "ue5 cpp", "UE5 / C++", "b829ea/fff", "Project+6", "Performance profiling and optimization suite"),
            entry(7, "Computer Vision Module", "ai python", "AI / Python", "00ff66/000", "Project+7", "Real-time object detection and tracking system"),
            entry(8, "Shader Library", "cpp", "C++", "fcee0a/000", "Project+8", "Collection of advanced rendering shaders"),
            entry(9, "Data Mining Suite", "ai python", "AI / Python", "00f0ff/000", "Project+9", "Advanced data extraction and analysis tools"),
        ],
        ai_projects: vec![
            entry(101, "GPT Fine-tuning Framework", "models", "Models", "00f0ff/000", "AI+Project+1", "Framework for fine-tuning language models"),
            entry(102, "ImageNet Classifier", "models", "Models", "00f0ff/000", "AI+Project+2", "Deep learning image classification system"),
            entry(103, "Anomaly Detection System", "tools", "Tools", "fcee0a/000", "AI+Project+3", "Real-time anomaly detection pipeline"),
            entry(104, "Reinforcement Learning Agents", "models", "Models", "00f0ff/000", "AI+Project+4", "RL agents for game playing and optimization"),
            entry(105, "Time Series Forecasting", "datasets", "Datasets", "00ff66/000", "AI+Project+5", "LSTM-based time series prediction models"),
        ],
        modules: vec![
            entry(201, "Scene Management", "", "", "b829ea/fff", "Module+1", "Handle dynamic scene loading and unloading for seamless gameplay"),
            entry(202, "Character Animation System", "", "", "b829ea/fff", "Module+2", "Advanced skeletal animation with IK and procedural blending"),
            entry(203, "Audio Processing Pipeline", "", "", "00f0ff/000", "Module+3", "Spatial audio, voice processing, and dynamic music system"),
            entry(204, "Network Replication", "", "", "fcee0a/000", "Module+4", "Multiplayer state synchronization and prediction framework"),
            entry(205, "UI/UX Framework", "", "", "00ff66/000", "Module+5", "Responsive HUD system with real-time data binding"),
            entry(206, "AI Behavior Trees", "", "", "b829ea/fff", "Module+6", "Modular behavior system for NPC intelligence"),
        ],
    }
}
