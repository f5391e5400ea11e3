pub mod panels;
pub mod social_graph;
