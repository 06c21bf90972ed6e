//! Redis Lua scripts for atomic operations

/// Lua script to delete expired booster rows across all actors
///
/// Keys: [actor_index]
/// Args: [now_ms, actor_key_prefix]
///
/// Returns: number of rows removed
///
/// Unreadable rows are removed too. Actors left without rows are dropped
/// from the index.
pub const DELETE_EXPIRED_SCRIPT: &str = r#"
local index = KEYS[1]
local now_ms = tonumber(ARGV[1])
local prefix = ARGV[2]
local removed = 0

local actors = redis.call('SMEMBERS', index)
for _, actor in ipairs(actors) do
  local key = prefix .. actor
  local fields = redis.call('HGETALL', key)
  for i = 1, #fields, 2 do
    local ok, record = pcall(cjson.decode, fields[i + 1])
    if (not ok) or type(record) ~= 'table' or tonumber(record['end_ms']) == nil
        or tonumber(record['end_ms']) <= now_ms then
      redis.call('HDEL', key, fields[i])
      removed = removed + 1
    end
  end
  if redis.call('HLEN', key) == 0 then
    redis.call('SREM', index, actor)
  end
end

return removed
"#;
