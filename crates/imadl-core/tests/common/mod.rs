pub mod knowledge_server;
