mod in_memory_queue;
mod redis_queue;

pub use in_memory_queue::InMemoryEmissionQueue;
pub use redis_queue::RedisEmissionQueue;
